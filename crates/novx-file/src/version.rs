//! Schema version constants and the version gate.

use std::path::Path;

use novx_core::{NovxError, Result};

/// Schema version this codec reads and writes.
pub const MAJOR_VERSION: u32 = 1;
pub const MINOR_VERSION: u32 = 3;

/// Fixed declaration, DOCTYPE, and stylesheet header of every novx file.
pub const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<!DOCTYPE novx SYSTEM \"novx_1_3.dtd\">\n\
<?xml-stylesheet href=\"novx.css\" type=\"text/css\"?>\n";

/// Gates a document on its declared `major.minor` schema version.
///
/// Within the supported major version an older minor version is accepted; a
/// newer minor version is not, and a different major version never is.
///
/// # Errors
///
/// [`NovxError::MissingVersion`] when the attribute is absent or does not
/// parse, [`NovxError::NewerVersion`] / [`NovxError::OlderVersion`] on a
/// version conflict.
pub fn check_version(version: Option<&str>, path: &Path) -> Result<(u32, u32)> {
    let location = path.display().to_string();
    let parsed = version.and_then(|v| {
        let (major, minor) = v.split_once('.')?;
        Some((major.parse::<u32>().ok()?, minor.parse::<u32>().ok()?))
    });
    let Some((major, minor)) = parsed else {
        return Err(NovxError::MissingVersion(location));
    };
    if major > MAJOR_VERSION {
        return Err(NovxError::NewerVersion(location));
    }
    if major < MAJOR_VERSION {
        return Err(NovxError::OlderVersion(location));
    }
    if minor > MINOR_VERSION {
        return Err(NovxError::NewerVersion(location));
    }
    Ok((major, minor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn check(version: Option<&str>) -> Result<(u32, u32)> {
        check_version(version, &PathBuf::from("test.novx"))
    }

    #[test]
    fn the_supported_version_passes() {
        assert_eq!(check(Some("1.3")).unwrap(), (1, 3));
    }

    #[test]
    fn older_minor_versions_pass() {
        assert_eq!(check(Some("1.0")).unwrap(), (1, 0));
        assert_eq!(check(Some("1.1")).unwrap(), (1, 1));
    }

    #[test]
    fn newer_minor_versions_are_rejected() {
        assert!(matches!(check(Some("1.4")), Err(NovxError::NewerVersion(_))));
    }

    #[test]
    fn different_major_versions_are_rejected() {
        assert!(matches!(check(Some("2.0")), Err(NovxError::NewerVersion(_))));
        assert!(matches!(check(Some("0.9")), Err(NovxError::OlderVersion(_))));
    }

    #[test]
    fn missing_or_garbled_versions_are_rejected() {
        assert!(matches!(check(None), Err(NovxError::MissingVersion(_))));
        assert!(matches!(check(Some("1")), Err(NovxError::MissingVersion(_))));
        assert!(matches!(check(Some("one.three")), Err(NovxError::MissingVersion(_))));
        assert!(matches!(check(Some("1.3.1")), Err(NovxError::MissingVersion(_))));
    }

    #[test]
    fn the_header_names_the_supported_dtd() {
        assert!(XML_HEADER.contains("novx_1_3.dtd"));
        assert!(XML_HEADER.starts_with("<?xml version=\"1.0\""));
    }
}
