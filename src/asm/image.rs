//! LS-8 program image format.
//!
//! A `.ls8` file is plain text:
//! - One byte per line, written in binary (`10000010`, optionally `0b10000010`)
//! - Everything after `#` is a comment
//! - Blank and comment-only lines are ignored
//! - Only the first token on a line is read

use crate::cpu::memory::MEMORY_SIZE;
use std::path::Path;
use std::io::Write;
use thiserror::Error;

/// A loaded program image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramImage {
    /// Bytes to place in memory from address 0.
    pub bytes: Vec<u8>,
    /// Source lines (for debugging).
    pub source_lines: Vec<String>,
}

impl ProgramImage {
    /// Create a new empty image.
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            source_lines: Vec::new(),
        }
    }

    /// Build an image from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            source_lines: bytes.iter().map(|b| format!("{:08b}", b)).collect(),
        }
    }

    /// Add a byte.
    pub fn push(&mut self, byte: u8, source: &str) {
        self.bytes.push(byte);
        self.source_lines.push(source.to_string());
    }

    /// Get the number of bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Default for ProgramImage {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an image from `.ls8` text.
pub fn parse_image(text: &str) -> Result<ProgramImage, ImageError> {
    let mut image = ProgramImage::new();

    for (line_num, line) in text.lines().enumerate() {
        let code = line.split('#').next().unwrap_or("").trim();

        if code.is_empty() {
            continue;
        }

        let token = code.split_whitespace().next().unwrap_or(code);
        let digits = token.strip_prefix("0b").unwrap_or(token);

        if digits.is_empty() || digits.len() > 8 || !digits.chars().all(|c| c == '0' || c == '1') {
            return Err(ImageError::ParseError {
                line: line_num + 1,
                message: format!("expected a binary byte, found `{}`", token),
            });
        }

        let byte = u8::from_str_radix(digits, 2).map_err(|e| ImageError::ParseError {
            line: line_num + 1,
            message: e.to_string(),
        })?;

        image.push(byte, line.trim());
    }

    if image.len() > MEMORY_SIZE {
        return Err(ImageError::TooLarge { size: image.len() });
    }

    Ok(image)
}

/// Load an image file from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ProgramImage, ImageError> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ImageError::IoError(e.to_string()))?;
    parse_image(&text)
}

/// Render an image as `.ls8` text.
pub fn format_image(image: &ProgramImage) -> String {
    let mut text = String::new();
    text.push_str("# LS-8 program image\n");
    text.push_str(&format!("# {} bytes\n\n", image.len()));

    for (i, byte) in image.bytes.iter().enumerate() {
        match image.source_lines.get(i) {
            Some(source) if !source.is_empty() => {
                text.push_str(&format!("{:08b} # {:02X}: {}\n", byte, i, source));
            }
            _ => text.push_str(&format!("{:08b} # {:02X}\n", byte, i)),
        }
    }

    text
}

/// Save an image to disk.
pub fn save_image<P: AsRef<Path>>(path: P, image: &ProgramImage) -> Result<(), ImageError> {
    let mut file = std::fs::File::create(path.as_ref())
        .map_err(|e| ImageError::IoError(e.to_string()))?;

    file.write_all(format_image(image).as_bytes())
        .map_err(|e| ImageError::IoError(e.to_string()))
}

/// Errors that can occur while loading or saving images.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("parse error on line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("program is {size} bytes, memory holds 256")]
    TooLarge { size: usize },
}
