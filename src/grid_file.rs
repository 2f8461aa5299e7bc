//! Plain `0`/`1` grid files: one line per row, one character per cell.

use halo_engines::Grid;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridFileError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid character {found:?} on line {line}, only '0' or '1' are allowed")]
    InvalidCharacter { line: usize, found: char },

    #[error("the input is empty or doesn't contain any valid grid representation")]
    Empty,

    #[error("line {line} has {found} cells, expected {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("input grid is not a square: {rows} rows of {cols} cells")]
    NotSquare { rows: usize, cols: usize },

    #[error(transparent)]
    Grid(#[from] halo_engines::Error),
}

/// Parses a square grid. Blank lines are skipped.
pub fn parse_grid(text: &str) -> Result<Grid, GridFileError> {
    let mut cells = Vec::new();
    let (mut rows, mut cols) = (0, 0);
    for (i, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let start = cells.len();
        for c in line.chars() {
            match c {
                '0' => cells.push(0),
                '1' => cells.push(1),
                found => return Err(GridFileError::InvalidCharacter { line: i + 1, found }),
            }
        }
        let found = cells.len() - start;
        if rows == 0 {
            cols = found;
        } else if found != cols {
            return Err(GridFileError::RaggedRow {
                line: i + 1,
                expected: cols,
                found,
            });
        }
        rows += 1;
    }

    if rows == 0 {
        return Err(GridFileError::Empty);
    }
    if rows != cols {
        return Err(GridFileError::NotSquare { rows, cols });
    }
    Ok(Grid::from_cells(rows, cols, cells)?)
}

pub fn read_grid(path: impl AsRef<Path>) -> Result<Grid, GridFileError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| GridFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_grid(&text)
}

/// Same format as [`parse_grid`] reads.
pub fn format_grid(grid: &Grid) -> String {
    let mut s = String::with_capacity(grid.rows() * (grid.cols() + 1));
    for row in grid.row_iter() {
        s.extend(row.iter().map(|&c| if c == 0 { '0' } else { '1' }));
        s.push('\n');
    }
    s
}

pub fn write_grid(path: impl AsRef<Path>, grid: &Grid) -> Result<(), GridFileError> {
    let path = path.as_ref();
    std::fs::write(path, format_grid(grid)).map_err(|source| GridFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_square_grid() {
        let grid = parse_grid("010\n\n001\r\n111\n").unwrap();
        assert_eq!(grid.shape(), (3, 3));
        assert_eq!(grid.cells(), &[0, 1, 0, 0, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse_grid("010\n0x0\n000\n"),
            Err(GridFileError::InvalidCharacter { line: 2, found: 'x' })
        ));
        assert!(matches!(parse_grid("\n\n"), Err(GridFileError::Empty)));
        assert!(matches!(
            parse_grid("01\n011\n"),
            Err(GridFileError::RaggedRow {
                line: 2,
                expected: 2,
                found: 3
            })
        ));
        assert!(matches!(
            parse_grid("011\n011\n"),
            Err(GridFileError::NotSquare { rows: 2, cols: 3 })
        ));
    }

    #[test]
    fn error_messages_name_the_problem() {
        let err = parse_grid("0 1\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid character ' ' on line 1, only '0' or '1' are allowed"
        );
    }

    #[test]
    fn file_round_trip() {
        let grid = Grid::random(12, 12, Some(5));
        let path = std::env::temp_dir().join(format!("torus_life_{}.txt", std::process::id()));
        write_grid(&path, &grid).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 12);
        assert_eq!(read_grid(&path).unwrap(), grid);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file() {
        let err = read_grid("/nonexistent/grid.txt").unwrap_err();
        assert!(matches!(err, GridFileError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/grid.txt"));
    }
}
