//! Static attribute metadata.
//!
//! [`AttributeCatalog`] maps attribute names found in node records to small
//! integer codes, client-facing labels and a hidden flag. Catalog order is
//! code order, and code order is the order in which a node's attributes are
//! materialized and presented.
//!
//! Each entry also declares its [`AttributeKind`], so materialization never
//! has to guess from a value whether it is a literal or a reference to
//! another node.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::AttrCode;

/// The display name of a node.
pub const NAME: AttrCode = AttrCode(1);
/// Raw birth-date text, used as the second ordering criterion.
pub const BIRTHDATE: AttrCode = AttrCode(10);
/// Synthetic children view.
pub const CHILD: AttrCode = AttrCode(90);
/// Synthetic siblings view.
pub const SIBLING: AttrCode = AttrCode(91);

/// How the value of an attribute is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Free text stored verbatim.
    Scalar,
    /// Key of a parent node; contributes to ancestry weight and to the
    /// children/siblings views.
    ParentLink,
    /// Key of a partner node.
    PartnerLink,
    /// Computed from the fact table after materialization; never read from
    /// node records.
    Derived,
}

impl AttributeKind {
    /// Whether values of this kind must resolve to another node's key.
    pub fn is_linking(self) -> bool {
        matches!(self, AttributeKind::ParentLink | AttributeKind::PartnerLink)
    }
}

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub code: AttrCode,
    /// Attribute name as it appears in node records.
    pub name: String,
    /// Human-readable label shown by the client.
    pub label: String,
    /// Whether the client normally hides rows with this code.
    pub hidden: bool,
    pub kind: AttributeKind,
}

impl AttributeDef {
    pub fn new(code: u32, name: &str, label: &str, hidden: bool, kind: AttributeKind) -> Self {
        AttributeDef {
            code: AttrCode(code),
            name: name.to_string(),
            label: label.to_string(),
            hidden,
            kind,
        }
    }
}

/// Ordered attribute catalog with name lookup.
#[derive(Debug, Clone)]
pub struct AttributeCatalog {
    defs: Vec<AttributeDef>,
    by_name: HashMap<String, usize>,
}

impl AttributeCatalog {
    /// Builds a catalog from entries listed in strictly increasing code order
    /// with unique names.
    pub fn new(defs: Vec<AttributeDef>) -> Result<Self, CoreError> {
        let mut by_name = HashMap::with_capacity(defs.len());
        for (pos, def) in defs.iter().enumerate() {
            if pos > 0 && defs[pos - 1].code >= def.code {
                return Err(CoreError::InvalidCatalog {
                    reason: format!(
                        "code {} ('{}') does not follow code {}",
                        def.code,
                        def.name,
                        defs[pos - 1].code
                    ),
                });
            }
            if by_name.insert(def.name.clone(), pos).is_some() {
                return Err(CoreError::InvalidCatalog {
                    reason: format!("duplicate attribute name '{}'", def.name),
                });
            }
        }
        Ok(AttributeCatalog { defs, by_name })
    }

    /// The catalog shared with the browsing client. Codes and labels are a
    /// compatibility contract and must not be renumbered.
    pub fn standard() -> Self {
        use AttributeKind::*;
        let defs = vec![
            AttributeDef::new(1, "name", "Name", true, Scalar),
            AttributeDef::new(2, "aka", "Also known as", false, Scalar),
            AttributeDef::new(3, "aka2", "Also known as", false, Scalar),
            AttributeDef::new(4, "aka3", "Also known as", false, Scalar),
            AttributeDef::new(5, "gender", "Gender", false, Scalar),
            AttributeDef::new(6, "profession", "Profession", false, Scalar),
            AttributeDef::new(7, "country", "Country", false, Scalar),
            AttributeDef::new(10, "birthdate", "Birth", false, Scalar),
            AttributeDef::new(11, "birthplace", "At", false, Scalar),
            AttributeDef::new(12, "birthplace?", "Probably at", false, Scalar),
            AttributeDef::new(20, "deathdate", "Death", false, Scalar),
            AttributeDef::new(21, "deathplace", "At", false, Scalar),
            AttributeDef::new(50, "father", "Father", true, ParentLink),
            AttributeDef::new(51, "mother", "Mother", true, ParentLink),
            AttributeDef::new(52, "parent", "Parent", true, ParentLink),
            AttributeDef::new(53, "parent2", "Parent", true, ParentLink),
            AttributeDef::new(54, "parent?", "Probable parent", true, ParentLink),
            AttributeDef::new(60, "partner", "Partner", false, PartnerLink),
            AttributeDef::new(61, "weddingdate", "Wedding", false, Scalar),
            AttributeDef::new(62, "weddingplace", "At", false, Scalar),
            AttributeDef::new(65, "partner2", "Second partner", false, PartnerLink),
            AttributeDef::new(66, "weddingdate2", "Second wedding", false, Scalar),
            AttributeDef::new(67, "weddingplace2", "At", false, Scalar),
            AttributeDef::new(68, "partner3", "Third partner", false, PartnerLink),
            AttributeDef::new(69, "weddingdate3", "Third wedding", false, Scalar),
            AttributeDef::new(70, "weddingplace3", "At", false, Scalar),
            AttributeDef::new(90, "child", "Child", true, Derived),
            AttributeDef::new(91, "sibling", "Sibling", true, Derived),
            AttributeDef::new(95, "comments", "More details", false, Scalar),
        ];
        // The table above is ordered and duplicate-free.
        let by_name = defs
            .iter()
            .enumerate()
            .map(|(pos, def)| (def.name.clone(), pos))
            .collect();
        AttributeCatalog { defs, by_name }
    }

    /// All entries in code order.
    pub fn defs(&self) -> &[AttributeDef] {
        &self.defs
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Looks up an entry by attribute name.
    pub fn resolve(&self, name: &str) -> Option<&AttributeDef> {
        self.by_name.get(name).map(|&pos| &self.defs[pos])
    }

    /// Looks up an entry by code.
    pub fn by_code(&self, code: AttrCode) -> Option<&AttributeDef> {
        self.defs
            .binary_search_by_key(&code, |def| def.code)
            .ok()
            .map(|pos| &self.defs[pos])
    }

    /// Codes of every parent-link attribute, ascending.
    pub fn parent_codes(&self) -> Vec<AttrCode> {
        self.defs
            .iter()
            .filter(|def| def.kind == AttributeKind::ParentLink)
            .map(|def| def.code)
            .collect()
    }

    /// Names of every parent-link attribute, in code order.
    pub fn parent_names(&self) -> impl Iterator<Item = &str> {
        self.defs
            .iter()
            .filter(|def| def.kind == AttributeKind::ParentLink)
            .map(|def| def.name.as_str())
    }
}

impl Default for AttributeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
