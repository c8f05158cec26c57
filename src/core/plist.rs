//! Property list parsing
//!
//! Decodes the XML property lists printed by `diskutil ... -plist` without
//! shelling out to an XML tool.

use crate::error::{RemountError, Result};
use regex::Regex;
use tracing::{debug, instrument};

/// A decoded property list value
#[derive(Debug, Clone, PartialEq)]
pub enum PlistValue {
    String(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Date(String),
    Data(String),
    Array(Vec<PlistValue>),
    /// Key order is kept as printed
    Dict(Vec<(String, PlistValue)>),
}

impl PlistValue {
    /// Look up a key in a dictionary value
    pub fn get(&self, key: &str) -> Option<&PlistValue> {
        match self {
            Self::Dict(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// String content, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Elements, if this is an array value
    #[cfg(test)]
    pub(crate) fn as_array(&self) -> Option<&[PlistValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Whether this value is a dictionary
    pub fn is_dict(&self) -> bool {
        matches!(self, Self::Dict(_))
    }

    /// Child values of an array or dictionary, in document order
    pub fn children(&self) -> Box<dyn Iterator<Item = &PlistValue> + '_> {
        match self {
            Self::Array(items) => Box::new(items.iter()),
            Self::Dict(entries) => Box::new(entries.iter().map(|(_, v)| v)),
            _ => Box::new(std::iter::empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open(String),
    Close(String),
    Empty(String),
    Text(String),
}

/// Property list parser backed by a small tag tokenizer
pub struct PlistParser {
    /// Regex for XML declarations, doctypes and comments
    re_prolog: Regex,
    /// Regex for tags and the text between them
    re_token: Regex,
}

impl PlistParser {
    /// Create a new property list parser
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_prolog: Regex::new(r"(?s)<\?.*?\?>|<!--.*?-->|<![A-Za-z][^>]*>")
                .map_err(|e| RemountError::config(format!("Failed to compile regex: {e}")))?,
            re_token: Regex::new(r"<(/)?([A-Za-z]+)[^>]*?(/)?>|([^<]+)")
                .map_err(|e| RemountError::config(format!("Failed to compile regex: {e}")))?,
        })
    }

    /// Parse a complete property list document
    #[instrument(skip(self, content))]
    pub fn parse(&self, content: &str) -> Result<PlistValue> {
        let tokens = self.tokenize(content)?;
        debug!("Property list has {} tokens", tokens.len());

        if tokens.is_empty() {
            return Err(RemountError::parsing("Property list is empty"));
        }

        let mut pos = 0;
        let wrapped = matches!(tokens.first(), Some(Token::Open(name)) if name == "plist");
        if wrapped {
            pos += 1;
        }

        let value = Self::parse_value(&tokens, &mut pos)?;

        if wrapped {
            Self::expect_close(&tokens, &mut pos, "plist")?;
        }

        if pos != tokens.len() {
            return Err(RemountError::parsing(format!(
                "Unexpected content after property list root: {:?}",
                tokens[pos]
            )));
        }

        Ok(value)
    }

    fn tokenize(&self, content: &str) -> Result<Vec<Token>> {
        let stripped = self.re_prolog.replace_all(content, "");
        let mut tokens = Vec::new();
        let mut last_end = 0;

        for cap in self.re_token.captures_iter(&stripped) {
            let whole = cap
                .get(0)
                .ok_or_else(|| RemountError::parsing("Malformed property list"))?;
            if whole.start() != last_end {
                return Err(Self::stray_markup(&stripped, last_end));
            }
            last_end = whole.end();

            if let Some(text) = cap.get(4) {
                if !text.as_str().trim().is_empty() {
                    tokens.push(Token::Text(unescape(text.as_str())));
                }
                continue;
            }

            let name = cap
                .get(2)
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| RemountError::parsing("Malformed tag in property list"))?;

            let token = match (cap.get(1).is_some(), cap.get(3).is_some()) {
                (true, _) => Token::Close(name),
                (false, true) => Token::Empty(name),
                (false, false) => Token::Open(name),
            };
            tokens.push(token);
        }

        if last_end != stripped.len() {
            return Err(Self::stray_markup(&stripped, last_end));
        }

        Ok(tokens)
    }

    fn stray_markup(content: &str, offset: usize) -> RemountError {
        let snippet: String = content[offset..].chars().take(20).collect();
        RemountError::parsing(format!(
            "Unrecognized markup at offset {offset}: '{snippet}'"
        ))
    }

    fn parse_value(tokens: &[Token], pos: &mut usize) -> Result<PlistValue> {
        let token = tokens
            .get(*pos)
            .ok_or_else(|| RemountError::parsing("Unexpected end of property list"))?;
        *pos += 1;

        match token {
            Token::Empty(name) => match name.as_str() {
                "true" => Ok(PlistValue::Boolean(true)),
                "false" => Ok(PlistValue::Boolean(false)),
                "string" => Ok(PlistValue::String(String::new())),
                "data" => Ok(PlistValue::Data(String::new())),
                "array" => Ok(PlistValue::Array(Vec::new())),
                "dict" => Ok(PlistValue::Dict(Vec::new())),
                other => Err(RemountError::parsing(format!(
                    "Unsupported empty element <{other}/>"
                ))),
            },
            Token::Open(name) => match name.as_str() {
                "dict" => Self::parse_dict(tokens, pos),
                "array" => Self::parse_array(tokens, pos),
                "string" => Ok(PlistValue::String(Self::read_text(tokens, pos, "string")?)),
                "date" => Ok(PlistValue::Date(Self::read_text(tokens, pos, "date")?)),
                "data" => {
                    let text = Self::read_text(tokens, pos, "data")?;
                    Ok(PlistValue::Data(text.split_whitespace().collect()))
                }
                "integer" => {
                    let text = Self::read_text(tokens, pos, "integer")?;
                    text.trim().parse().map(PlistValue::Integer).map_err(|e| {
                        RemountError::parsing(format!("Invalid integer '{text}'")).with_source(e)
                    })
                }
                "real" => {
                    let text = Self::read_text(tokens, pos, "real")?;
                    text.trim().parse().map(PlistValue::Real).map_err(|e| {
                        RemountError::parsing(format!("Invalid real '{text}'")).with_source(e)
                    })
                }
                other => Err(RemountError::parsing(format!("Unsupported element <{other}>"))),
            },
            Token::Close(name) => Err(RemountError::parsing(format!(
                "Unexpected closing tag </{name}>"
            ))),
            Token::Text(text) => Err(RemountError::parsing(format!(
                "Unexpected text '{}'",
                text.trim()
            ))),
        }
    }

    fn parse_dict(tokens: &[Token], pos: &mut usize) -> Result<PlistValue> {
        let mut entries = Vec::new();

        loop {
            match tokens.get(*pos) {
                Some(Token::Close(name)) if name == "dict" => {
                    *pos += 1;
                    return Ok(PlistValue::Dict(entries));
                }
                Some(Token::Open(name)) if name == "key" => {
                    *pos += 1;
                    let key = Self::read_text(tokens, pos, "key")?;
                    let value = Self::parse_value(tokens, pos)?;
                    entries.push((key, value));
                }
                Some(Token::Empty(name)) if name == "key" => {
                    *pos += 1;
                    let value = Self::parse_value(tokens, pos)?;
                    entries.push((String::new(), value));
                }
                Some(other) => {
                    return Err(RemountError::parsing(format!(
                        "Expected <key> in dictionary, found {other:?}"
                    )));
                }
                None => return Err(RemountError::parsing("Unterminated <dict>")),
            }
        }
    }

    fn parse_array(tokens: &[Token], pos: &mut usize) -> Result<PlistValue> {
        let mut items = Vec::new();

        loop {
            match tokens.get(*pos) {
                Some(Token::Close(name)) if name == "array" => {
                    *pos += 1;
                    return Ok(PlistValue::Array(items));
                }
                Some(_) => items.push(Self::parse_value(tokens, pos)?),
                None => return Err(RemountError::parsing("Unterminated <array>")),
            }
        }
    }

    /// Read optional text content followed by the matching closing tag
    fn read_text(tokens: &[Token], pos: &mut usize, element: &str) -> Result<String> {
        let text = match tokens.get(*pos) {
            Some(Token::Text(text)) => {
                *pos += 1;
                text.clone()
            }
            _ => String::new(),
        };
        Self::expect_close(tokens, pos, element)?;
        Ok(text)
    }

    fn expect_close(tokens: &[Token], pos: &mut usize, element: &str) -> Result<()> {
        match tokens.get(*pos) {
            Some(Token::Close(name)) if name == element => {
                *pos += 1;
                Ok(())
            }
            other => Err(RemountError::parsing(format!(
                "Expected </{element}>, found {other:?}"
            ))),
        }
    }
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>DeviceIdentifier</key>
	<string>disk2s1</string>
	<key>Ejectable</key>
	<true/>
	<key>MountPoint</key>
	<string>/Volumes/Tom &amp; Jerry</string>
	<key>Size</key>
	<integer>500107837440</integer>
	<key>Empty</key>
	<string></string>
	<key>Flags</key>
	<array/>
</dict>
</plist>
"#;

    #[test]
    fn test_parse_info_dict() {
        let parser = PlistParser::new().unwrap();
        let root = parser.parse(INFO_PLIST).unwrap();

        assert!(root.is_dict());
        assert_eq!(root.get("DeviceIdentifier").and_then(PlistValue::as_str), Some("disk2s1"));
        assert_eq!(root.get("Ejectable"), Some(&PlistValue::Boolean(true)));
        assert_eq!(
            root.get("MountPoint").and_then(PlistValue::as_str),
            Some("/Volumes/Tom & Jerry")
        );
        assert_eq!(root.get("Size"), Some(&PlistValue::Integer(500_107_837_440)));
        assert_eq!(root.get("Empty").and_then(PlistValue::as_str), Some(""));
        assert_eq!(root.get("Flags").and_then(PlistValue::as_array), Some(&[][..]));
        assert!(root.get("Missing").is_none());
    }

    #[test]
    fn test_nested_arrays_keep_order() {
        let parser = PlistParser::new().unwrap();
        let root = parser
            .parse("<plist><array><string>a</string><dict><key>k</key><false/></dict><string>b</string></array></plist>")
            .unwrap();

        let items = root.as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_str(), Some("a"));
        assert_eq!(items[1].get("k"), Some(&PlistValue::Boolean(false)));
        assert_eq!(items[2].as_str(), Some("b"));
    }

    #[test]
    fn test_rejects_malformed_documents() {
        let parser = PlistParser::new().unwrap();

        for input in [
            "",
            "   \n",
            "not a plist",
            "<plist><dict><key>a</key></dict></plist>",
            "<plist><dict><string>x</string></dict></plist>",
            "<plist><array><string>x</string></plist>",
            "<plist><integer>abc</integer></plist>",
            "<plist><dict><key>VolumeName</key><string>A</string><</dict></plist>",
            "<plist><dict></dict></plist><",
        ] {
            let err = parser.parse(input).unwrap_err();
            assert!(
                matches!(err, RemountError::Parsing { .. }),
                "expected parsing error for {input:?}, got {err:?}"
            );
        }
    }
}
