//! Triangle strip resolution.
//!
//! Meshes store one marker byte per vertex. A nonzero marker opens a strip and names its
//! winding (1 or 2); the vertex after it is always part of that strip, and every following
//! vertex with a zero marker extends it by one triangle.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triangle(pub [u32; 3]);

impl Triangle {
    pub fn indices(&self) -> [u32; 3] {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    /// Even triangles keep strip order, odd ones swap their first two vertices.
    Forward = 1,
    /// Mirror of `Forward`: even triangles swap, odd ones keep strip order.
    Reverse = 2,
}

impl TryFrom<u8> for Winding {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        match value {
            1 => Ok(Self::Forward),
            2 => Ok(Self::Reverse),
            other => Err(other),
        }
    }
}

/// A run of consecutive vertices forming one strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strip {
    pub start: u32,
    pub len: u32,
    /// Marker of the strip's first vertex.
    pub kind: u8,
}

impl Strip {
    /// Appends the strip's `len - 2` triangles to `out`.
    pub fn triangulate(&self, out: &mut Vec<Triangle>) -> Result<()> {
        let count = self.len.saturating_sub(2);
        if count == 0 {
            return Ok(());
        }

        let winding = Winding::try_from(self.kind).map_err(|kind| {
            Error::malformed(
                self.start as usize,
                format!("strip at vertex {} has winding type {kind}", self.start),
            )
        })?;

        out.reserve(count as usize);
        for i in 0..count {
            let a = self.start + i;
            let (b, c) = (a + 1, a + 2);
            let odd = i % 2 == 1;
            let triangle = match (winding, odd) {
                (Winding::Forward, false) | (Winding::Reverse, true) => [a, b, c],
                (Winding::Forward, true) | (Winding::Reverse, false) => [b, a, c],
            };
            out.push(Triangle(triangle));
        }
        Ok(())
    }
}

/// Splits a marker stream into strips.
///
/// A strip that is still open when the last vertex is reached is closed there. A strip opened on
/// the very last vertex is never closed since it cannot produce a triangle.
pub fn strips(markers: &[u8]) -> Vec<Strip> {
    let mut strips = Vec::new();
    let Some(last) = markers.len().checked_sub(1) else {
        return strips;
    };

    let mut open: Option<Strip> = None;
    let mut i = 0;
    while i < markers.len() {
        if let Some(strip) = open.as_mut() {
            if markers[i] == 0 {
                strip.len += 1;
            } else {
                strips.push(*strip);
                open = None;
            }
        }

        if markers[i] != 0 && open.is_none() {
            open = Some(Strip {
                start: i as u32,
                len: 2,
                kind: markers[i],
            });
            // The second vertex belongs to the strip whatever its marker says.
            i += 1;
        }

        if i == last {
            if let Some(strip) = open.take() {
                strips.push(strip);
            }
        }
        i += 1;
    }

    strips
}

/// Rebuilds the triangle list of a marker stream.
pub fn resolve(markers: &[u8]) -> Result<Vec<Triangle>> {
    let mut triangles = Vec::new();
    for strip in strips(markers) {
        strip.triangulate(&mut triangles)?;
    }
    Ok(triangles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tris(markers: &[u8]) -> Vec<[u32; 3]> {
        resolve(markers)
            .unwrap()
            .into_iter()
            .map(|t| t.indices())
            .collect()
    }

    #[test]
    fn single_forward_triangle() {
        assert_eq!(tris(&[1, 0, 0]), vec![[0, 1, 2]]);
    }

    #[test]
    fn reverse_strip_alternates() {
        let triangles = tris(&[2, 0, 0, 0]);
        assert_eq!(triangles, vec![[1, 0, 2], [1, 2, 3]]);
        assert!(triangles.iter().flatten().all(|&v| v <= 3));
    }

    #[test]
    fn forward_strip_alternates() {
        assert_eq!(
            tris(&[1, 0, 0, 0, 0]),
            vec![[0, 1, 2], [2, 1, 3], [2, 3, 4]]
        );
    }

    #[test]
    fn invalid_winding_is_malformed() {
        assert!(matches!(
            resolve(&[5, 0, 0, 3, 0]),
            Err(Error::MalformedChunk { .. })
        ));
    }

    #[test]
    fn consecutive_strips() {
        // Strip of 4 at 0, then a strip of 3 at 4.
        assert_eq!(
            strips(&[1, 0, 0, 0, 2, 0, 0]),
            vec![
                Strip { start: 0, len: 4, kind: 1 },
                Strip { start: 4, len: 3, kind: 2 },
            ]
        );
        assert_eq!(
            tris(&[1, 0, 0, 0, 2, 0, 0]),
            vec![[0, 1, 2], [2, 1, 3], [5, 4, 6]]
        );
    }

    #[test]
    fn second_vertex_marker_is_ignored() {
        // The 1 at index 1 is consumed as the strip's second vertex, not a new strip.
        assert_eq!(
            strips(&[2, 1, 0, 0]),
            vec![Strip { start: 0, len: 4, kind: 2 }]
        );
    }

    #[test]
    fn leading_zero_markers_are_skipped() {
        assert_eq!(tris(&[0, 0, 1, 0, 0]), vec![[2, 3, 4]]);
        assert!(strips(&[0, 0, 0]).is_empty());
        assert!(strips(&[]).is_empty());
    }

    #[test]
    fn short_strips_emit_nothing() {
        // A two-vertex strip closed by the next start, and a start on the final vertex.
        assert_eq!(
            strips(&[1, 0, 2]),
            vec![Strip { start: 0, len: 2, kind: 1 }]
        );
        assert!(tris(&[1, 0, 2]).is_empty());
        // Unknown winding on a strip without triangles is never checked.
        assert!(tris(&[7, 0, 1, 0]).is_empty());
    }
}
