use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;

pub fn read_json_file<T>(path: &Path) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);
    let value = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse JSON: {}", path.display()))?;
    Ok(value)
}

pub fn write_json_stdout<T>(value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    println!("{json}");
    Ok(())
}
