//! Helpers shared by the DOCX and PPTX backends

use std::fs::File;
use std::io::Read;
use std::path::Path;

use roxmltree::Node;
use zip::ZipArchive;

use super::backend::Metadata;
use crate::error::{Result, ViewerError};

pub const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// EMUs per point (DrawingML)
pub const EMU_PER_PT: f32 = 12_700.0;
/// Twentieths of a point (WordprocessingML)
pub const TWIPS_PER_PT: f32 = 20.0;

pub struct Package {
    archive: ZipArchive<File>,
}

impl Package {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| ViewerError::io(path, e))?;
        let archive = ZipArchive::new(file)
            .map_err(|e| ViewerError::corrupt(path, format!("not an Office package: {e}")))?;
        Ok(Self { archive })
    }

    /// Read a part as UTF-8, `None` when the part does not exist
    pub fn read_part(&mut self, path: &Path, name: &str) -> Result<Option<String>> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(ViewerError::corrupt(path, format!("{name}: {e}"))),
        };

        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .map_err(|e| ViewerError::corrupt(path, format!("{name}: {e}")))?;
        Ok(Some(content))
    }

    pub fn require_part(&mut self, path: &Path, name: &str) -> Result<String> {
        self.read_part(path, name)?
            .ok_or_else(|| ViewerError::corrupt(path, format!("missing {name}")))
    }

    /// Core and extended document properties
    pub fn properties(&mut self, path: &Path, format: &str) -> Metadata {
        let mut metadata = Metadata {
            format: Some(format.to_string()),
            ..Metadata::default()
        };

        if let Ok(Some(core)) = self.read_part(path, "docProps/core.xml") {
            if let Ok(doc) = roxmltree::Document::parse(&core) {
                let root = doc.root_element();
                metadata.title = child_text(root, "title");
                metadata.author = child_text(root, "creator");
                metadata.subject = child_text(root, "subject");
                metadata.keywords = child_text(root, "keywords");
                metadata.created = child_text(root, "created");
                metadata.modified = child_text(root, "modified");
            }
        }

        if let Ok(Some(app)) = self.read_part(path, "docProps/app.xml") {
            if let Ok(doc) = roxmltree::Document::parse(&app) {
                metadata.creator = child_text(doc.root_element(), "Application");
            }
        }

        metadata
    }
}

pub fn parse_xml<'a>(path: &Path, part: &str, xml: &'a str) -> Result<roxmltree::Document<'a>> {
    roxmltree::Document::parse(xml).map_err(|e| ViewerError::corrupt(path, format!("{part}: {e}")))
}

fn child_text(node: Node, name: &str) -> Option<String> {
    node.children()
        .find(|child| child.tag_name().name() == name)
        .and_then(|child| child.text())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

pub fn is(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

pub fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| is(child, name))
}

pub fn descendant<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants().find(|child| is(child, name))
}

/// Attribute by local name, whatever its namespace
pub fn attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|attribute| attribute.name() == name)
        .map(|attribute| attribute.value())
}

pub fn attr_f32(node: Node, name: &str) -> Option<f32> {
    attr(node, name).and_then(|value| value.trim().parse::<f32>().ok())
}

/// Resolve a relationship target against the directory of its source part
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut parts: Vec<&str> = base_dir.split('/').filter(|p| !p.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}
