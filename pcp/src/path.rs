/// Validates that destination path doesn't end with problematic patterns like . or ..
///
/// # Arguments
/// * `dst_path_str` - Destination path string to validate
///
/// # Returns
/// * `Ok(())` - If path is valid
/// * `Err(...)` - If path ends with . or .. with clear error message
pub fn validate_destination_path(dst_path_str: &str) -> anyhow::Result<()> {
    // Path::file_name() normalizes these away, so check the raw string
    if dst_path_str.ends_with("/.") || dst_path_str == "." {
        return Err(anyhow::anyhow!(
            "Destination path cannot end with '.' (current directory).\n\
            If you want to copy into the current directory, use './' instead.\n\
            Example: 'pcp big.iso ./' copies big.iso into current directory as big.iso"
        ));
    }
    if dst_path_str.ends_with("/..") || dst_path_str == ".." {
        return Err(anyhow::anyhow!(
            "Destination path cannot end with '..' (parent directory).\n\
            If you want to copy into the parent directory, use '../' instead.\n\
            Example: 'pcp big.iso ../' copies big.iso into parent directory as big.iso"
        ));
    }
    Ok(())
}

/// Resolves the final destination file.
///
/// A destination with a trailing slash, or one naming an existing directory, means "copy into":
/// the source's base name is appended. Anything else is used as-is.
pub fn resolve_destination_path(
    src_path_str: &str,
    dst_path_str: &str,
) -> anyhow::Result<std::path::PathBuf> {
    validate_destination_path(dst_path_str)?;
    let dst_path = std::path::Path::new(dst_path_str);
    if dst_path_str.ends_with('/') || dst_path.is_dir() {
        let src_path = std::path::Path::new(src_path_str);
        let src_file_name = src_path.file_name().ok_or_else(|| {
            anyhow::anyhow!("Source path {:?} does not have a basename", src_path)
        })?;
        // "baz/" + "bar" -> "baz/bar"
        Ok(dst_path.join(src_file_name))
    } else {
        Ok(dst_path.to_path_buf())
    }
}
