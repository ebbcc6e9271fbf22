//! Extended-XYZ reader and writer.
//!
//! A file is a sequence of frames. Each frame is:
//!
//! ```text
//! <natoms>
//! key=value key="quoted value" key={brace value} flag Properties=species:S:1:pos:R:3
//! <one row per atom, columns laid out by Properties>
//! ```
//!
//! Per-atom rows are kept as raw tokens so that a read/write cycle does not
//! reformat numbers the MD code produced. Typed access goes through the
//! accessor methods on `Structure`.

use std::fs;
use std::path::Path;

use crate::error::AppError;

/// Column type of a per-atom property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Str,
    Real,
    Int,
    Logical,
}

impl PropertyKind {
    fn parse(code: &str) -> Option<Self> {
        match code {
            "S" => Some(PropertyKind::Str),
            "R" => Some(PropertyKind::Real),
            "I" => Some(PropertyKind::Int),
            "L" => Some(PropertyKind::Logical),
            _ => None,
        }
    }

    fn code(self) -> &'static str {
        match self {
            PropertyKind::Str => "S",
            PropertyKind::Real => "R",
            PropertyKind::Int => "I",
            PropertyKind::Logical => "L",
        }
    }
}

/// One entry of the `Properties=` layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub kind: PropertyKind,
    pub cols: usize,
}

/// A single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    info: Vec<(String, String)>,
    properties: Vec<Property>,
    rows: Vec<Vec<String>>,
}

fn default_properties() -> Vec<Property> {
    vec![
        Property {
            name: "species".to_string(),
            kind: PropertyKind::Str,
            cols: 1,
        },
        Property {
            name: "pos".to_string(),
            kind: PropertyKind::Real,
            cols: 3,
        },
    ]
}

impl Structure {
    /// Build a frame from species labels and Cartesian positions.
    pub fn from_atoms(species: &[&str], positions: &[[f64; 3]]) -> Self {
        let rows = species
            .iter()
            .zip(positions)
            .map(|(s, p)| {
                vec![
                    s.to_string(),
                    format!("{:.8}", p[0]),
                    format!("{:.8}", p[1]),
                    format!("{:.8}", p[2]),
                ]
            })
            .collect();
        Self {
            info: Vec::new(),
            properties: default_properties(),
            rows,
        }
    }

    pub fn natoms(&self) -> usize {
        self.rows.len()
    }

    pub fn info(&self, key: &str) -> Option<&str> {
        self.info
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_info(&self, key: &str) -> bool {
        self.info(key).is_some()
    }

    /// Insert or replace a per-frame value.
    pub fn set_info(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.info.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.info.push((key.to_string(), value)),
        }
    }

    /// Scalar per-frame value, e.g. `QM_energy`.
    pub fn info_f64(&self, key: &str) -> Result<f64, AppError> {
        let raw = self
            .info(key)
            .ok_or_else(|| AppError::format(format!("Frame has no `{key}` value.")))?;
        raw.trim()
            .parse::<f64>()
            .map_err(|_| AppError::format(format!("`{key}` is not a number: '{raw}'")))
    }

    /// Vector per-frame value, e.g. `QM_virial="1 0 0 0 1 0 0 0 1"`.
    pub fn info_vec(&self, key: &str) -> Result<Vec<f64>, AppError> {
        let raw = self
            .info(key)
            .ok_or_else(|| AppError::format(format!("Frame has no `{key}` value.")))?;
        raw.split_whitespace()
            .map(|tok| {
                tok.parse::<f64>()
                    .map_err(|_| AppError::format(format!("`{key}` has a non-numeric entry: '{tok}'")))
            })
            .collect()
    }

    /// Real per-atom array flattened row-major, e.g. `QM_forces` -> `natoms * 3` values.
    pub fn array_f64(&self, name: &str) -> Result<Vec<f64>, AppError> {
        let (offset, prop) = self.column_range(name)?;
        if prop.kind != PropertyKind::Real && prop.kind != PropertyKind::Int {
            return Err(AppError::format(format!("Property `{name}` is not numeric.")));
        }
        let mut out = Vec::with_capacity(self.rows.len() * prop.cols);
        for row in &self.rows {
            for tok in &row[offset..offset + prop.cols] {
                let v = tok
                    .parse::<f64>()
                    .map_err(|_| AppError::format(format!("`{name}` has a non-numeric entry: '{tok}'")))?;
                out.push(v);
            }
        }
        Ok(out)
    }

    fn column_range(&self, name: &str) -> Result<(usize, &Property), AppError> {
        let mut offset = 0;
        for prop in &self.properties {
            if prop.name == name {
                return Ok((offset, prop));
            }
            offset += prop.cols;
        }
        Err(AppError::format(format!("Frame has no per-atom property `{name}`.")))
    }
}

/// Read every frame of an extended-XYZ file.
pub fn read_frames(path: &Path) -> Result<Vec<Structure>, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read structure file '{}': {e}", path.display())))?;
    parse_frames(&text).map_err(|(line, message)| {
        AppError::format(format!("{}:{line}: {message}", path.display()))
    })
}

/// Write frames in order, replacing any existing file.
pub fn write_frames(path: &Path, frames: &[Structure]) -> Result<(), AppError> {
    fs::write(path, format_frames(frames))
        .map_err(|e| AppError::io(format!("Failed to write structure file '{}': {e}", path.display())))
}

/// Render frames to extended-XYZ text.
pub fn format_frames(frames: &[Structure]) -> String {
    let mut out = String::new();
    for frame in frames {
        out.push_str(&format!("{}\n", frame.natoms()));

        let mut fields: Vec<String> = frame
            .info
            .iter()
            .map(|(k, v)| format!("{k}={}", quote_value(v)))
            .collect();
        let layout: Vec<String> = frame
            .properties
            .iter()
            .map(|p| format!("{}:{}:{}", p.name, p.kind.code(), p.cols))
            .collect();
        fields.push(format!("Properties={}", layout.join(":")));
        out.push_str(&fields.join(" "));
        out.push('\n');

        for row in &frame.rows {
            out.push_str(&row.join(" "));
            out.push('\n');
        }
    }
    out
}

fn quote_value(value: &str) -> String {
    let bracketed = value.starts_with('{') && value.ends_with('}');
    if !bracketed && (value.is_empty() || value.contains(char::is_whitespace)) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

/// Parse frames; errors are `(1-based line, message)`.
pub fn parse_frames(text: &str) -> Result<Vec<Structure>, (usize, String)> {
    let lines: Vec<&str> = text.lines().collect();
    let mut frames = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        if lines[idx].trim().is_empty() {
            idx += 1;
            continue;
        }

        let natoms: usize = lines[idx]
            .trim()
            .parse()
            .map_err(|_| (idx + 1, format!("Expected atom count, found '{}'", lines[idx].trim())))?;
        idx += 1;

        let comment = lines
            .get(idx)
            .ok_or_else(|| (idx + 1, "Missing comment line after atom count".to_string()))?;
        let (info, properties) = parse_comment(comment).map_err(|msg| (idx + 1, msg))?;
        idx += 1;

        let available = lines.len() - idx;
        if natoms > available {
            return Err((
                lines.len() + 1,
                format!("Frame ended early: expected {natoms} atom rows, found {available}"),
            ));
        }

        let width: usize = properties.iter().map(|p| p.cols).sum();
        let mut rows = Vec::with_capacity(natoms);
        for line in &lines[idx..idx + natoms] {
            let row: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            if row.len() != width {
                return Err((
                    idx + 1,
                    format!("Expected {width} columns per atom, found {}", row.len()),
                ));
            }
            rows.push(row);
            idx += 1;
        }

        frames.push(Structure {
            info,
            properties,
            rows,
        });
    }

    Ok(frames)
}

type Comment = (Vec<(String, String)>, Vec<Property>);

fn parse_comment(line: &str) -> Result<Comment, String> {
    let pairs = tokenize_pairs(line)?;

    // A plain-XYZ free-text comment has no key=value pairs at all.
    let is_extended = pairs.iter().any(|(_, v)| v.is_some());
    if !is_extended {
        return Ok((Vec::new(), default_properties()));
    }

    let mut info = Vec::new();
    let mut properties = None;
    for (key, value) in pairs {
        let value = value.unwrap_or_else(|| "T".to_string());
        if key.eq_ignore_ascii_case("properties") {
            properties = Some(parse_properties(&value)?);
        } else {
            info.push((key, value));
        }
    }

    Ok((info, properties.unwrap_or_else(default_properties)))
}

fn parse_properties(value: &str) -> Result<Vec<Property>, String> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.is_empty() || parts.len() % 3 != 0 {
        return Err(format!("Malformed Properties layout '{value}'"));
    }
    parts
        .chunks(3)
        .map(|chunk| {
            let kind = PropertyKind::parse(chunk[1])
                .ok_or_else(|| format!("Unknown property type '{}' for `{}`", chunk[1], chunk[0]))?;
            let cols = chunk[2]
                .parse::<usize>()
                .ok()
                .filter(|&c| c > 0)
                .ok_or_else(|| format!("Invalid column count '{}' for `{}`", chunk[2], chunk[0]))?;
            Ok(Property {
                name: chunk[0].to_string(),
                kind,
                cols,
            })
        })
        .collect()
}

/// Split `a=1 b="x y" c={1 2} flag` into `(key, Option<value>)`.
fn tokenize_pairs(line: &str) -> Result<Vec<(String, Option<String>)>, String> {
    let chars: Vec<char> = line.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '=' {
            i += 1;
        }
        let key: String = chars[start..i].iter().collect();

        if i >= chars.len() || chars[i] != '=' {
            out.push((key, None));
            continue;
        }
        i += 1;

        let value = match chars.get(i) {
            Some('"') => {
                let close = find_from(&chars, i + 1, '"')
                    .ok_or_else(|| format!("Unterminated quote in value of `{key}`"))?;
                let v: String = chars[i + 1..close].iter().collect();
                i = close + 1;
                v
            }
            Some('{') => {
                let close = find_from(&chars, i + 1, '}')
                    .ok_or_else(|| format!("Unterminated brace in value of `{key}`"))?;
                let v: String = chars[i..=close].iter().collect();
                i = close + 1;
                v
            }
            _ => {
                let vstart = i;
                while i < chars.len() && !chars[i].is_whitespace() {
                    i += 1;
                }
                chars[vstart..i].iter().collect()
            }
        };
        out.push((key, Some(value)));
    }

    Ok(out)
}

fn find_from(chars: &[char], from: usize, target: char) -> Option<usize> {
    chars[from..]
        .iter()
        .position(|&c| c == target)
        .map(|p| p + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FRAMES: &str = "\
2
Lattice=\"5.0 0.0 0.0 0.0 5.0 0.0 0.0 0.0 5.0\" Properties=species:S:1:pos:R:3:QM_forces:R:3 QM_energy=-2.0 pbc=\"T T T\"
Si 0.0 0.0 0.0 0.1 0.0 0.0
C 1.5 1.5 1.5 -0.1 0.0 0.0
1
QM_energy=-4.5 Properties=species:S:1:pos:R:3:QM_forces:R:3
Si 0.0 0.0 0.0 0.0 0.0 0.0
";

    #[test]
    fn reads_all_frames_with_info_and_arrays() {
        let frames = parse_frames(TWO_FRAMES).unwrap();
        assert_eq!(frames.len(), 2);

        let first = &frames[0];
        assert_eq!(first.natoms(), 2);
        assert_eq!(first.info_f64("QM_energy").unwrap(), -2.0);
        assert_eq!(first.info("pbc"), Some("T T T"));
        let species: Vec<&str> = first.rows.iter().map(|row| row[0].as_str()).collect();
        assert_eq!(species, vec!["Si", "C"]);
        assert_eq!(
            first.array_f64("QM_forces").unwrap(),
            vec![0.1, 0.0, 0.0, -0.1, 0.0, 0.0]
        );
        assert_eq!(frames[1].info_f64("QM_energy").unwrap(), -4.5);
    }

    #[test]
    fn write_then_read_preserves_frames() {
        let frames = parse_frames(TWO_FRAMES).unwrap();
        let text = format_frames(&frames);
        let again = parse_frames(&text).unwrap();
        assert_eq!(frames, again);
        assert!(text.contains("pbc=\"T T T\""));
    }

    #[test]
    fn plain_xyz_comment_uses_default_layout() {
        let frames = parse_frames("1\nwater fragment\nO 0 0 0\n").unwrap();
        assert_eq!(frames[0].natoms(), 1);
        assert!(frames[0].info.is_empty());
        assert_eq!(frames[0].array_f64("pos").unwrap(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn brace_values_and_flags() {
        let frames = parse_frames("1\nv={1 2 3} is_ok Properties=species:S:1:pos:R:3\nH 0 0 0\n").unwrap();
        assert_eq!(frames[0].info("v"), Some("{1 2 3}"));
        assert_eq!(frames[0].info("is_ok"), Some("T"));
    }

    #[test]
    fn column_mismatch_reports_line() {
        let err = parse_frames("2\nProperties=species:S:1:pos:R:3\nSi 0 0 0\nC 0 0\n").unwrap_err();
        assert_eq!(err.0, 4);
        assert!(err.1.contains("Expected 4 columns"));
    }

    #[test]
    fn truncated_frame_is_an_error() {
        let err = parse_frames("3\nQM_energy=1.0\nSi 0 0 0\n").unwrap_err();
        assert!(err.1.contains("ended early"));
    }

    #[test]
    fn huge_atom_count_is_an_error_not_an_allocation() {
        let err = parse_frames("18446744073709551615\nQM_energy=1.0\nSi 0 0 0\n").unwrap_err();
        assert!(err.1.contains("ended early"), "{}", err.1);
        assert_eq!(err.0, 4);
    }

    #[test]
    fn atom_count_beyond_the_file_names_the_shortfall() {
        let err = parse_frames("1\nQM_energy=1.0\nSi 0 0 0\n5\nQM_energy=2.0\nSi 0 0 0\n").unwrap_err();
        assert!(err.1.contains("expected 5 atom rows, found 1"), "{}", err.1);
    }

    #[test]
    fn empty_text_has_no_frames() {
        assert!(parse_frames("").unwrap().is_empty());
        assert!(parse_frames("\n\n").unwrap().is_empty());
    }

    #[test]
    fn missing_label_is_format_error() {
        let frame = Structure::from_atoms(&["Si"], &[[0.0, 0.0, 0.0]]);
        let err = frame.info_f64("QM_energy").unwrap_err();
        assert_eq!(err.exit_code(), 65);
    }
}
