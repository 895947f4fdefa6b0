//! Configuration sources: files, readers and in-memory text.

use crate::error::{ConfigError, ConfigResult};
use crate::parser::{detect_parser_by_extension, parse_any, ConfigParser};
use crate::value::ConfigValue;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

enum Origin {
    File(PathBuf),
    Text(String),
}

/// One configuration source, layered onto the destination in load order.
pub struct Source {
    /// Name used in log events and error messages
    name: String,
    /// Parser for the content, or `None` to try every format
    parser: Option<Box<dyn ConfigParser>>,
    origin: Origin,
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("name", &self.name)
            .field("parser", &self.parser.as_ref().map(|p| p.name()))
            .finish()
    }
}

impl Source {
    /// Creates a source backed by a file on disk.
    ///
    /// The parser is picked from the file extension; files with an unknown or
    /// missing extension are decoded by trying every supported format. The
    /// file is read when the source is loaded, not here.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let parser = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| detect_parser_by_extension(ext).ok());

        Self {
            name: path.display().to_string(),
            parser,
            origin: Origin::File(path),
        }
    }

    /// Creates a source from an already open reader.
    ///
    /// # Errors
    /// * `ConfigError::Io` - If the reader fails or yields invalid UTF-8
    pub fn from_reader<R: Read>(
        name: impl Into<String>,
        parser: Box<dyn ConfigParser>,
        mut reader: R,
    ) -> ConfigResult<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Ok(Self::from_text(name, parser, content))
    }

    /// Creates a source from in-memory text.
    pub fn from_text(
        name: impl Into<String>,
        parser: Box<dyn ConfigParser>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            parser: Some(parser),
            origin: Origin::Text(content.into()),
        }
    }

    /// Returns the name of this source.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if this source has to be read from disk.
    pub fn is_file(&self) -> bool {
        matches!(self.origin, Origin::File(_))
    }

    /// Reads the raw text of this source.
    pub(crate) fn read(&self) -> ConfigResult<String> {
        match &self.origin {
            Origin::File(path) => fs::read_to_string(path).map_err(ConfigError::Io),
            Origin::Text(text) => Ok(text.clone()),
        }
    }

    /// Parses text previously returned by [`Source::read`].
    ///
    /// Parse errors are re-labelled with the source name.
    pub(crate) fn parse(&self, content: &str) -> ConfigResult<ConfigValue> {
        let Some(parser) = &self.parser else {
            return parse_any(&self.name, content);
        };

        parser.parse(content).map_err(|e| match e {
            ConfigError::Parse {
                source_name: _,
                message,
            } => ConfigError::parse_error(&self.name, message),
            other => other,
        })
    }
}
