use std::borrow::Cow;

use binrw::BinRead;
use hashbrown::HashMap;
use tracing::{debug, info, trace, warn};

use crate::{
    chunk::ChunkTag,
    cursor::{CursorBuffer, Record},
    error::{Error, Result},
    image::Image,
    mesh::Mesh,
    palette::Palette,
    renumber, CCS_MAGIC,
};

/// Upper bound on either name table; anything larger means the header is garbage.
pub const MAX_NAMES: u32 = 10_000;

/// Fixed width of a name table slot, null terminator included.
pub const NAME_SLOT_SIZE: usize = 32;

/// Reserved bytes between the object names and the first chunk tag.
const DATA_SECTION_PADDING: usize = 8;

#[derive(BinRead, Debug)]
struct ContainerHeader {
    name: [u8; 4],
    #[br(pad_before = 23 + 24, map = renumber)]
    file_name_count: u32,
    #[br(map = renumber)]
    object_name_count: u32,
}

impl Record for ContainerHeader {
    const SIZE: usize = 59;
}

/// How the chunk loop stopped.
#[derive(Debug)]
pub enum ScanEnd {
    /// One of the end-of-section tags was read.
    Terminator(u32),
    /// The input ended before a chunk header could be read.
    EndOfInput,
    /// A chunk declared more bytes than the input has left. Nothing from it was decoded.
    TruncatedChunk {
        offset: usize,
        tag: ChunkTag,
        size: usize,
    },
    /// A palette failed to decode. Palettes frame the images that follow them, so the scan stopped.
    PaletteFailure { offset: usize, error: Error },
}

impl ScanEnd {
    /// Whether the data section ended with a terminator tag.
    pub fn is_complete(&self) -> bool {
        matches!(self, ScanEnd::Terminator(_))
    }
}

/// A chunk whose contents were dropped while the scan carried on.
#[derive(Debug)]
pub struct ChunkIssue {
    pub offset: usize,
    pub tag: ChunkTag,
    pub error: Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameUse {
    Image,
    Palette,
    Mesh,
    Material,
}

/// An id that does not index into the object name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnresolvedName {
    pub usage: NameUse,
    pub id: u32,
}

#[derive(Debug)]
pub struct ScanReport {
    pub end: ScanEnd,
    pub issues: Vec<ChunkIssue>,
    /// Number of chunks seen per tag, terminator excluded.
    pub census: HashMap<ChunkTag, usize>,
    pub unresolved: Vec<UnresolvedName>,
}

#[derive(Debug)]
pub struct Container {
    pub name: String,
    pub file_names: Vec<String>,
    pub object_names: Vec<String>,
    pub images: Vec<Image>,
    pub meshes: Vec<Mesh>,
    pub report: ScanReport,
}

impl Container {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::read(&mut CursorBuffer::new(data))
    }

    /// Decodes a whole container from the cursor's current position.
    ///
    /// Fails only when the header or name tables cannot be read. Problems inside the data section
    /// are recorded in [`Container::report`] and whatever was decoded before them is kept.
    pub fn read(cursor: &mut CursorBuffer) -> Result<Self> {
        read_magic(cursor)?;

        let header_offset = cursor.position();
        let header: ContainerHeader = cursor.read_record()?;
        let name = slot_to_string(&header.name);
        if header.file_name_count > MAX_NAMES || header.object_name_count > MAX_NAMES {
            return Err(Error::malformed(
                header_offset,
                format!(
                    "too many names: {} files, {} objects",
                    header.file_name_count, header.object_name_count
                ),
            ));
        }

        // Slot 0 of each 1-based table is reserved.
        cursor.reserved(NAME_SLOT_SIZE)?;
        let file_names = read_names(cursor, header.file_name_count)?;
        cursor.reserved(NAME_SLOT_SIZE)?;
        let object_names = read_names(cursor, header.object_name_count)?;
        cursor.reserved(DATA_SECTION_PADDING)?;
        debug!(
            "{name}: {} file names, {} object names",
            file_names.len(),
            object_names.len()
        );

        let mut scanner = Scanner {
            cursor,
            images: Vec::new(),
            meshes: Vec::new(),
            issues: Vec::new(),
            census: HashMap::new(),
        };
        let end = scanner.run();
        let Scanner {
            mut images,
            mut meshes,
            issues,
            census,
            ..
        } = scanner;
        images.shrink_to_fit();
        meshes.shrink_to_fit();

        let mut container = Self {
            name,
            file_names,
            object_names,
            images,
            meshes,
            report: ScanReport {
                end,
                issues,
                census,
                unresolved: Vec::new(),
            },
        };
        container.report.unresolved = container.find_unresolved();

        info!(
            "{}: {} images, {} meshes ({} chunks dropped)",
            container.name,
            container.images.len(),
            container.meshes.len(),
            container.report.issues.len()
        );
        Ok(container)
    }

    pub fn object_name(&self, id: u32) -> Option<&str> {
        self.object_names.get(id as usize).map(String::as_str)
    }

    pub fn file_name(&self, id: u32) -> Option<&str> {
        self.file_names.get(id as usize).map(String::as_str)
    }

    /// Object name for `id`, or a generated `object_<id>` label when it is out of range.
    pub fn label(&self, id: u32) -> Cow<'_, str> {
        match self.object_name(id) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("object_{id}")),
        }
    }

    /// Name of the texture a mesh's material refers to: the object entry right after the material.
    pub fn texture_name(&self, mesh: &Mesh) -> Option<&str> {
        self.object_name(mesh.material_id.checked_add(1)?)
    }

    fn find_unresolved(&self) -> Vec<UnresolvedName> {
        let images = self.images.iter().flat_map(|image| {
            std::iter::once((NameUse::Image, image.id))
                .chain(image.palettes.iter().map(|p| (NameUse::Palette, p.id)))
        });
        let meshes = self
            .meshes
            .iter()
            .flat_map(|mesh| [(NameUse::Mesh, mesh.id), (NameUse::Material, mesh.material_id)]);

        images
            .chain(meshes)
            .filter(|&(_, id)| self.object_name(id).is_none())
            .map(|(usage, id)| {
                warn!("{usage:?} id {id} is not in the object name table");
                UnresolvedName { usage, id }
            })
            .collect()
    }
}

/// Reads the 4-byte magic and checks it against [`CCS_MAGIC`].
pub fn read_magic(cursor: &mut CursorBuffer) -> Result<()> {
    let found = cursor.read_u32()?;
    if found != CCS_MAGIC {
        return Err(Error::InvalidHeader { found });
    }
    Ok(())
}

fn read_names(cursor: &mut CursorBuffer, count: u32) -> Result<Vec<String>> {
    (0..count)
        .map(|_| {
            let slot = cursor.read_array::<NAME_SLOT_SIZE>()?;
            Ok(slot_to_string(&slot))
        })
        .collect()
}

/// Cuts a fixed-width slot at its first null byte.
fn slot_to_string(slot: &[u8]) -> String {
    let len = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
    String::from_utf8_lossy(&slot[..len]).into_owned()
}

#[derive(Debug, Clone, Copy)]
struct Chunk {
    tag: ChunkTag,
    /// Offset of the tag
    offset: usize,
    /// Offset of the body, right after the length
    start: usize,
    size: usize,
}

impl Chunk {
    fn end(&self) -> usize {
        self.start + self.size
    }
}

struct Scanner<'a> {
    cursor: &'a mut CursorBuffer,
    images: Vec<Image>,
    meshes: Vec<Mesh>,
    issues: Vec<ChunkIssue>,
    census: HashMap<ChunkTag, usize>,
}

impl Scanner<'_> {
    fn run(&mut self) -> ScanEnd {
        let mut group = Vec::new();
        let end = loop {
            let chunk = match self.next_chunk() {
                Ok(chunk) => chunk,
                Err(end) => break end,
            };
            *self.census.entry(chunk.tag).or_default() += 1;

            if let Err(error) = self.decode(chunk, &mut group) {
                break ScanEnd::PaletteFailure {
                    offset: chunk.offset,
                    error,
                };
            }

            // The declared size decides where the next chunk starts, whatever the decoder consumed.
            if self.cursor.seek_to(chunk.end()).is_err() {
                break ScanEnd::EndOfInput;
            }
        };

        if !group.is_empty() {
            debug!("{} palettes not followed by an image", group.len());
        }
        match &end {
            ScanEnd::Terminator(tag) => debug!("data section ended with {tag:#010x}"),
            ScanEnd::EndOfInput => warn!("input ended without a terminator"),
            ScanEnd::TruncatedChunk { offset, tag, size } => {
                warn!("{tag} chunk at {offset:#x} declares {size} bytes past the end of input")
            }
            ScanEnd::PaletteFailure { offset, error } => {
                warn!("palette at {offset:#x} failed, stopping: {error}")
            }
        }
        end
    }

    /// Reads the next chunk header, or how the scan ends.
    fn next_chunk(&mut self) -> std::result::Result<Chunk, ScanEnd> {
        let offset = self.cursor.position();
        let raw = self.cursor.read_u32().map_err(|_| ScanEnd::EndOfInput)?;
        let tag = ChunkTag::from(raw);
        if tag.is_terminator() {
            return Err(ScanEnd::Terminator(raw));
        }

        let words = self.cursor.read_u32().map_err(|_| ScanEnd::EndOfInput)?;
        let size = (words as usize).saturating_mul(4);
        if size > self.cursor.remaining() {
            return Err(ScanEnd::TruncatedChunk { offset, tag, size });
        }

        let chunk = Chunk {
            tag,
            offset,
            start: self.cursor.position(),
            size,
        };
        trace!("{tag} chunk at {offset:#x}, {size} bytes");
        Ok(chunk)
    }

    /// Decodes one chunk. `group` holds the palettes collected for the next image.
    ///
    /// Only a palette failure is returned as an error; everything else is recorded and skipped.
    fn decode(&mut self, chunk: Chunk, group: &mut Vec<Palette>) -> Result<()> {
        match chunk.tag {
            ChunkTag::Palette => {
                group.push(Palette::read(self.cursor, chunk.size)?);
            }
            ChunkTag::Image => {
                match Image::read(self.cursor, chunk.size) {
                    Ok(mut image) => {
                        image.palettes = std::mem::take(group);
                        self.images.push(image);
                    }
                    Err(error) => {
                        group.clear();
                        self.drop_chunk(chunk, error);
                    }
                }
            }
            ChunkTag::Mesh => match Mesh::read(self.cursor) {
                Ok(mesh) => self.meshes.push(mesh),
                Err(error) => self.drop_chunk(chunk, error),
            },
            ChunkTag::Unknown(raw) => debug!("skipping unknown chunk {raw:#010x}"),
            _ => {}
        }
        Ok(())
    }

    fn drop_chunk(&mut self, chunk: Chunk, error: Error) {
        warn!("dropping {} chunk at {:#x}: {error}", chunk.tag, chunk.offset);
        self.issues.push(ChunkIssue {
            offset: chunk.offset,
            tag: chunk.tag,
            error,
        });
    }
}
