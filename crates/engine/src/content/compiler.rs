use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

use super::catalog::ItemCatalog;
use super::types::{
    ArmorData, ConsumableData, Durability, GunData, Item, ItemKind, Pricing, WeaponData,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorCode {
    ReadFile,
    XmlMalformed,
    InvalidRoot,
    UnknownItemType,
    UnknownField,
    DuplicateField,
    MissingField,
    InvalidValue,
    DuplicateItemId,
}

#[derive(Debug, Clone)]
pub struct CatalogError {
    pub code: CatalogErrorCode,
    pub message: String,
    pub file_path: PathBuf,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (file={}, line={}, column={})",
                self.code,
                self.message,
                self.file_path.display(),
                loc.line,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (file={})",
                self.code,
                self.message,
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for CatalogError {}

const COMMON_FIELDS: &[&str] = &["id", "name", "info"];
const WEAPON_FIELDS: &[&str] = &["attack", "durability", "effect", "cost", "salePrice"];
const GUN_FIELDS: &[&str] = &["attack", "durability", "effect", "cost", "salePrice", "range"];
const ARMOR_FIELDS: &[&str] = &["defense", "effect", "cost", "salePrice"];
const CONSUMABLE_FIELDS: &[&str] = &["healing", "cost", "salePrice"];

/// Compiles every `*.xml` file under `content_dir` (sorted by relative path) into one catalog.
pub fn compile_item_catalog(content_dir: &Path) -> Result<ItemCatalog, CatalogError> {
    let xml_files = collect_xml_files_sorted(content_dir)
        .map_err(|error| read_error(error.path, error.source))?;

    let mut merged = BTreeMap::<String, Item>::new();
    for xml_file in xml_files {
        let raw = fs::read_to_string(&xml_file)
            .map_err(|source| read_error(xml_file.clone(), source))?;
        for item in parse_items_document(&xml_file, &raw)? {
            if merged.contains_key(&item.id) {
                return Err(CatalogError {
                    code: CatalogErrorCode::DuplicateItemId,
                    message: format!("duplicate item id '{}'; ids must be unique", item.id),
                    file_path: xml_file.clone(),
                    location: None,
                });
            }
            merged.insert(item.id.clone(), item);
        }
    }

    Ok(ItemCatalog::from_items(merged.into_values().collect()))
}

impl ItemCatalog {
    pub fn from_xml_str(file_path: &Path, raw: &str) -> Result<Self, CatalogError> {
        let items = parse_items_document(file_path, raw)?;
        let mut seen = HashSet::<&str>::new();
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(CatalogError {
                    code: CatalogErrorCode::DuplicateItemId,
                    message: format!("duplicate item id '{}'; ids must be unique", item.id),
                    file_path: file_path.to_path_buf(),
                    location: None,
                });
            }
        }
        Ok(Self::from_items(items))
    }
}

fn parse_items_document(file_path: &Path, raw: &str) -> Result<Vec<Item>, CatalogError> {
    let doc = Document::parse(raw).map_err(|error| CatalogError {
        code: CatalogErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "Items" {
        return Err(error_at_node(
            CatalogErrorCode::InvalidRoot,
            "root element must be <Items>".to_string(),
            file_path,
            &doc,
            root,
        ));
    }

    let mut items = Vec::<Item>::new();
    for child in root.children().filter(|node| node.is_element()) {
        let element = child.tag_name().name();
        let allowed = match element {
            "Weapon" => WEAPON_FIELDS,
            "Gun" => GUN_FIELDS,
            "Armor" => ARMOR_FIELDS,
            "Consumable" => CONSUMABLE_FIELDS,
            other => {
                return Err(error_at_node(
                    CatalogErrorCode::UnknownItemType,
                    format!(
                        "unsupported item type <{other}>; allowed: Weapon, Gun, Armor, Consumable"
                    ),
                    file_path,
                    &doc,
                    child,
                ))
            }
        };
        let fields = FieldReader::collect(file_path, &doc, child, allowed)?;
        items.push(fields.into_item(element)?);
    }

    Ok(items)
}

struct FieldReader<'a, 'input> {
    file_path: &'a Path,
    doc: &'a Document<'input>,
    element: Node<'a, 'input>,
    fields: BTreeMap<String, (String, Node<'a, 'input>)>,
}

impl<'a, 'input> FieldReader<'a, 'input> {
    fn collect(
        file_path: &'a Path,
        doc: &'a Document<'input>,
        element: Node<'a, 'input>,
        allowed: &[&str],
    ) -> Result<Self, CatalogError> {
        let element_name = element.tag_name().name();
        let mut fields = BTreeMap::new();
        for field in element.children().filter(|child| child.is_element()) {
            let field_name = field.tag_name().name().to_string();
            if !COMMON_FIELDS.contains(&field_name.as_str()) && !allowed.contains(&field_name.as_str())
            {
                return Err(error_at_node(
                    CatalogErrorCode::UnknownField,
                    format!("unknown field <{field_name}> in <{element_name}>"),
                    file_path,
                    doc,
                    field,
                ));
            }
            let text = field.text().map(str::trim).unwrap_or_default().to_string();
            if fields.insert(field_name.clone(), (text, field)).is_some() {
                return Err(error_at_node(
                    CatalogErrorCode::DuplicateField,
                    format!("duplicate field <{field_name}> in <{element_name}>"),
                    file_path,
                    doc,
                    field,
                ));
            }
        }
        Ok(Self {
            file_path,
            doc,
            element,
            fields,
        })
    }

    fn into_item(self, element: &str) -> Result<Item, CatalogError> {
        let id = self.required_text("id")?;
        let name = self.required_text("name")?;
        let info = self.optional_text("info").unwrap_or_default();
        let pricing = Pricing {
            cost: self.required_u32("cost")?,
            sale_price: self.required_u32("salePrice")?,
        };

        let kind = match element {
            "Weapon" => ItemKind::Weapon(self.weapon_data(pricing)?),
            "Gun" => ItemKind::Gun(GunData {
                weapon: self.weapon_data(pricing)?,
                range: self.required_range()?,
            }),
            "Armor" => ItemKind::Armor(ArmorData {
                defense: self.required_u32("defense")?,
                effect: self.optional_text("effect"),
                pricing,
            }),
            _ => ItemKind::Consumable(ConsumableData {
                healing: self.required_u32("healing")?,
                pricing,
            }),
        };

        Ok(Item {
            id,
            name,
            info,
            kind,
        })
    }

    fn weapon_data(&self, pricing: Pricing) -> Result<WeaponData, CatalogError> {
        Ok(WeaponData {
            attack: self.required_u32("attack")?,
            durability: self.required_durability()?,
            effect: self.optional_text("effect"),
            pricing,
        })
    }

    fn optional_text(&self, field_name: &str) -> Option<String> {
        self.fields
            .get(field_name)
            .map(|(text, _)| text.clone())
            .filter(|text| !text.is_empty())
    }

    fn required_text(&self, field_name: &str) -> Result<String, CatalogError> {
        let Some((text, node)) = self.fields.get(field_name) else {
            return Err(self.missing(field_name));
        };
        if text.is_empty() {
            return Err(error_at_node(
                CatalogErrorCode::MissingField,
                format!("field <{field_name}> must not be empty"),
                self.file_path,
                self.doc,
                *node,
            ));
        }
        Ok(text.clone())
    }

    fn required_u32(&self, field_name: &str) -> Result<u32, CatalogError> {
        let value = self.required_text(field_name)?;
        value.parse::<u32>().map_err(|_| {
            self.invalid(
                field_name,
                format!("{field_name} '{value}' must be a non-negative integer"),
            )
        })
    }

    fn required_durability(&self) -> Result<Durability, CatalogError> {
        let value = self.required_text("durability")?;
        value
            .parse::<i64>()
            .ok()
            .and_then(Durability::from_raw)
            .ok_or_else(|| {
                self.invalid(
                    "durability",
                    format!("durability '{value}' must be -1 (infinite) or a non-negative integer"),
                )
            })
    }

    fn required_range(&self) -> Result<f32, CatalogError> {
        let value = self.required_text("range")?;
        let parsed = value.parse::<f32>().map_err(|_| {
            self.invalid("range", format!("range '{value}' is not a valid number"))
        })?;
        if !parsed.is_finite() || parsed < 0.0 {
            return Err(self.invalid("range", "range must be finite and >= 0".to_string()));
        }
        Ok(parsed)
    }

    fn missing(&self, field_name: &str) -> CatalogError {
        error_at_node(
            CatalogErrorCode::MissingField,
            format!(
                "missing required field <{field_name}> in <{}>",
                self.element.tag_name().name()
            ),
            self.file_path,
            self.doc,
            self.element,
        )
    }

    fn invalid(&self, field_name: &str, message: String) -> CatalogError {
        let node = self
            .fields
            .get(field_name)
            .map(|(_, node)| *node)
            .unwrap_or(self.element);
        error_at_node(
            CatalogErrorCode::InvalidValue,
            message,
            self.file_path,
            self.doc,
            node,
        )
    }
}

fn error_at_node(
    code: CatalogErrorCode,
    message: String,
    file_path: &Path,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> CatalogError {
    let pos = doc.text_pos_at(node.range().start);
    CatalogError {
        code,
        message,
        file_path: file_path.to_path_buf(),
        location: Some(SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }),
    }
}

struct ReadError {
    path: PathBuf,
    source: std::io::Error,
}

fn collect_xml_files_sorted(root: &Path) -> Result<Vec<PathBuf>, ReadError> {
    let mut files = Vec::<(String, PathBuf)>::new();
    collect_recursive(root, root, &mut files)?;
    files.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

fn collect_recursive(
    root: &Path,
    current: &Path,
    files: &mut Vec<(String, PathBuf)>,
) -> Result<(), ReadError> {
    let entries = fs::read_dir(current).map_err(|source| ReadError {
        path: current.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ReadError {
            path: current.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(root, &path, files)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        {
            let rel = path.strip_prefix(root).unwrap_or(path.as_path());
            files.push((normalize_rel_path(rel), path.clone()));
        }
    }
    Ok(())
}

fn normalize_rel_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn read_error(path: PathBuf, source: std::io::Error) -> CatalogError {
    CatalogError {
        code: CatalogErrorCode::ReadFile,
        message: format!("failed to read XML file: {source}"),
        file_path: path,
        location: None,
    }
}
