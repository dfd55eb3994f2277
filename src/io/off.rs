// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! OFF (Object File Format) reader and writer
//!
//! ```text
//! OFF
//! <vertices> <faces> <edges>
//! x y z            (one line per vertex)
//! n i0 i1 ... in-1 (one line per face, 0-based vertex indices)
//! ```
//!
//! Lines starting with `#` and lines shorter than two characters are skipped.
//! The edge count is written as 0 and ignored on read.

use crate::error::{KernelError, Result};
use crate::geometry::{HalfEdgeMesh, VertexDescriptor};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;
use std::str::FromStr;

const HEADER: &str = "OFF";

/// Upper bound on slots reserved from the announced counts
const MAX_RESERVED: usize = 1 << 16;

/// Skips comments and short lines, tracking 1-based line numbers
struct ContentLines<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> ContentLines<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    fn next_content(&mut self) -> Result<Option<(usize, String)>> {
        for line in self.lines.by_ref() {
            let line = line?;
            self.line_no += 1;
            if line.len() > 1 && !line.starts_with('#') {
                return Ok(Some((self.line_no, line)));
            }
        }
        Ok(None)
    }
}

fn parse_token<T: FromStr>(line: usize, token: &str) -> Result<T> {
    token.parse().map_err(|_| KernelError::BadNumber {
        line,
        token: token.to_string(),
    })
}

/// Parse `expected` leading numbers of a line
fn parse_values<T: FromStr>(line: usize, text: &str, expected: usize) -> Result<Vec<T>> {
    let values = text
        .split_whitespace()
        .take(expected)
        .map(|token| parse_token(line, token))
        .collect::<Result<Vec<T>>>()?;
    if values.len() < expected {
        return Err(KernelError::ShortLine {
            line,
            expected,
            found: values.len(),
        });
    }
    Ok(values)
}

/// Read an OFF mesh from any buffered reader
pub fn read_off_from<R: BufRead>(reader: R) -> Result<HalfEdgeMesh> {
    let mut lines = ContentLines::new(reader);

    let (_, header) = lines.next_content()?.ok_or(KernelError::MissingHeader)?;
    if header.trim() != HEADER {
        return Err(KernelError::BadHeader(header));
    }

    let (line, counts) = lines.next_content()?.ok_or(KernelError::MissingCounts)?;
    let counts: Vec<usize> = counts
        .split_whitespace()
        .take(3)
        .map(|token| parse_token(line, token))
        .collect::<Result<_>>()?;
    let (vertex_count, face_count) = match counts.as_slice() {
        [v, f, ..] => (*v, *f),
        _ => return Err(KernelError::MissingCounts),
    };

    // the counts only bound the loops; storage grows with the lines actually read
    let mut mesh = HalfEdgeMesh::with_capacity(
        vertex_count.min(MAX_RESERVED),
        face_count.min(MAX_RESERVED),
    );
    let mut vertices = Vec::with_capacity(vertex_count.min(MAX_RESERVED));
    for index in 0..vertex_count {
        let (line, text) = lines
            .next_content()?
            .ok_or(KernelError::MissingVertex { index })?;
        let xyz: Vec<f64> = parse_values(line, &text, 3)?;
        vertices.push(mesh.add_vertex_xyz(xyz[0], xyz[1], xyz[2]));
    }

    let mut face: Vec<VertexDescriptor> = Vec::new();
    for index in 0..face_count {
        let (line, text) = lines
            .next_content()?
            .ok_or(KernelError::MissingFace { index })?;
        let mut tokens = text.split_whitespace();
        let n: usize = match tokens.next() {
            Some(token) => parse_token(line, token)?,
            None => return Err(KernelError::MissingFace { index }),
        };
        if n < 3 {
            return Err(KernelError::FaceTooSmall { line, count: n });
        }

        let tokens: Vec<&str> = tokens.take(n).collect();
        if tokens.len() < n {
            return Err(KernelError::ShortLine {
                line,
                expected: n + 1,
                found: tokens.len() + 1,
            });
        }

        face.clear();
        for token in tokens {
            let i: usize = parse_token(line, token)?;
            let v = vertices
                .get(i)
                .copied()
                .ok_or(KernelError::FaceIndexOutOfRange {
                    line,
                    index: i,
                    vertex_count,
                })?;
            face.push(v);
        }
        mesh.add_face(&face)?;
    }

    Ok(mesh)
}

/// Parse an OFF document held in memory
pub fn parse_off(source: &str) -> Result<HalfEdgeMesh> {
    read_off_from(source.as_bytes())
}

/// Read an OFF file
pub fn read_off(path: impl AsRef<Path>) -> Result<HalfEdgeMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mesh = read_off_from(BufReader::new(file))?;
    log::info!(
        "loaded {}: {} vertices, {} faces",
        path.display(),
        mesh.number_of_vertices(),
        mesh.number_of_faces()
    );
    Ok(mesh)
}

/// Write a mesh as OFF.
///
/// Live vertices are renumbered densely in iteration order. Each face line
/// starts at the source vertex of the face's first half-edge, which is the
/// first vertex the face was created with.
pub fn write_off_to<W: Write>(mut writer: W, mesh: &HalfEdgeMesh) -> Result<()> {
    writeln!(writer, "{}", HEADER)?;
    writeln!(
        writer,
        "{} {} 0",
        mesh.number_of_vertices(),
        mesh.number_of_faces()
    )?;

    let mut file_index = vec![usize::MAX; mesh.number_of_internal_vertices()];
    for (i, v) in mesh.vertices().enumerate() {
        file_index[v.index()] = i;
        let p = mesh.position(v);
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }

    for f in mesh.faces() {
        let halfedges = mesh.get_halfedges_around_face(f);
        write!(writer, "{}", halfedges.len())?;
        for &h in halfedges {
            write!(writer, " {}", file_index[mesh.source(h).index()])?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write a mesh to an OFF file
pub fn write_off(path: impl AsRef<Path>, mesh: &HalfEdgeMesh) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_off_to(BufWriter::new(file), mesh)?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

/// Render a mesh as an OFF document
pub fn to_off_string(mesh: &HalfEdgeMesh) -> Result<String> {
    let mut buffer = Vec::new();
    write_off_to(&mut buffer, mesh)?;
    String::from_utf8(buffer).map_err(|err| {
        KernelError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    })
}
