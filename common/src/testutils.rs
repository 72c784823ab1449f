#[cfg(test)]
pub async fn create_temp_dir() -> anyhow::Result<std::path::PathBuf> {
    let mut idx = 0;
    loop {
        let tmp_dir = std::env::temp_dir().join(format!("pcp_test{}", &idx));
        if let Err(error) = tokio::fs::create_dir(&tmp_dir).await {
            match error.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    idx += 1;
                }
                _ => return Err(error.into()),
            }
        } else {
            return Ok(tmp_dir);
        }
    }
}

/// Deterministic, non-repeating-looking content so that misplaced ranges are caught.
#[cfg(test)]
pub fn pattern(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| ((i * 31) ^ (i >> 8) ^ (i >> 16)) as u8)
        .collect()
}

#[cfg(test)]
pub async fn create_source_file(
    dir: &std::path::Path,
    name: &str,
    size: usize,
) -> anyhow::Result<(std::path::PathBuf, Vec<u8>)> {
    let path = dir.join(name);
    let contents = pattern(size);
    tokio::fs::write(&path, &contents).await?;
    Ok((path, contents))
}
