//! Font metrics used by the line wrapper and the layout engine.
//!
//! Every measure and draw call takes an explicit [`FontSpec`], so the measuring
//! pass and the drawing pass can never disagree because of leftover font state.

use std::sync::Arc;

use resvg::usvg::fontdb;
use tracing::{debug, warn};

use crate::error::CardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Regular,
    Bold,
}

impl FontWeight {
    /// CSS numeric weight, as written into the SVG.
    pub fn css(self) -> u16 {
        match self {
            Self::Regular => 400,
            Self::Bold => 700,
        }
    }

    fn fontdb(self) -> fontdb::Weight {
        match self {
            Self::Regular => fontdb::Weight::NORMAL,
            Self::Bold => fontdb::Weight::BOLD,
        }
    }
}

/// Size and weight of a text run. The family list is fixed per card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub size: f32,
    pub weight: FontWeight,
}

impl FontSpec {
    pub const fn regular(size: f32) -> Self {
        Self {
            size,
            weight: FontWeight::Regular,
        }
    }

    pub const fn bold(size: f32) -> Self {
        Self {
            size,
            weight: FontWeight::Bold,
        }
    }
}

/// Anything that can report the rendered pixel width of a string.
///
/// Implementations must be pure: the same `(text, font)` always yields the
/// same width.
pub trait TextMeasure {
    fn width(&self, text: &str, font: &FontSpec) -> f32;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn width(&self, text: &str, font: &FontSpec) -> f32 {
        (**self).width(text, font)
    }
}

/// Faces resolved for one family entry of the card's font stack.
struct FamilyFaces {
    name: String,
    regular: fontdue::Font,
    bold: Option<fontdue::Font>,
}

impl FamilyFaces {
    fn face(&self, weight: FontWeight) -> &fontdue::Font {
        match weight {
            FontWeight::Bold => self.bold.as_ref().unwrap_or(&self.regular),
            FontWeight::Regular => &self.regular,
        }
    }
}

/// System-font backed [`TextMeasure`].
///
/// Resolves each configured family through `fontdb` (the database the
/// rasterizer renders with) and measures advances with `fontdue`. Glyphs
/// missing from the first family fall through to the next one, so Latin and
/// CJK text can share a stack like `["Noto Sans", "Noto Sans CJK JP"]`.
pub struct FontBook {
    db: Arc<fontdb::Database>,
    families: Vec<FamilyFaces>,
    css_family: String,
}

impl FontBook {
    /// Scan system fonts and resolve `families`.
    ///
    /// This walks every font file on the machine, so call it once at startup
    /// from a blocking context.
    pub fn system(families: &[String]) -> Result<Self, CardError> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        debug!("font database loaded with {} faces", db.len());
        resolve_generic_sans(&mut db);
        Self::from_database(Arc::new(db), families)
    }

    /// Resolve `families` against an existing database.
    pub fn from_database(
        db: Arc<fontdb::Database>,
        families: &[String],
    ) -> Result<Self, CardError> {
        let mut resolved = Vec::new();
        for name in families {
            let Some(regular) = load_face(&db, name, FontWeight::Regular)? else {
                warn!("font family '{name}' not found, skipping");
                continue;
            };
            let bold = load_face(&db, name, FontWeight::Bold)?;
            resolved.push(FamilyFaces {
                name: name.clone(),
                regular,
                bold,
            });
        }

        if resolved.is_empty() {
            return Err(CardError::FontUnavailable(families.join(", ")));
        }

        let css_family = css_family_list(families);
        Ok(Self {
            db,
            families: resolved,
            css_family,
        })
    }

    /// Shared font database, handed to the rasterizer.
    pub fn database(&self) -> Arc<fontdb::Database> {
        Arc::clone(&self.db)
    }

    /// `font-family` attribute value for the SVG text elements.
    pub fn css_family(&self) -> &str {
        &self.css_family
    }

    /// Names of the families that actually resolved, in fallback order.
    pub fn resolved_families(&self) -> impl Iterator<Item = &str> {
        self.families.iter().map(|f| f.name.as_str())
    }

    fn face_for(&self, ch: char, weight: FontWeight) -> &fontdue::Font {
        self.families
            .iter()
            .map(|f| f.face(weight))
            .find(|face| face.lookup_glyph_index(ch) != 0)
            .unwrap_or_else(|| self.families[0].face(weight))
    }
}

impl TextMeasure for FontBook {
    /// Sum of advances plus pair kerning, which the rasterizer also applies.
    /// Kerning only applies between neighbours drawn from the same face.
    fn width(&self, text: &str, font: &FontSpec) -> f32 {
        let mut width = 0.0;
        let mut prev: Option<(char, &fontdue::Font)> = None;
        for ch in text.chars() {
            let face = self.face_for(ch, font.weight);
            if let Some((left, left_face)) = prev
                && std::ptr::eq(left_face, face)
            {
                width += face.horizontal_kern(left, ch, font.size).unwrap_or(0.0);
            }
            width += face.metrics(ch, font.size).advance_width;
            prev = Some((ch, face));
        }
        width
    }
}

/// Sans families tried, in order, when the database's generic sans-serif
/// name is not installed.
const INSTALLED_SANS_CANDIDATES: [&str; 6] = [
    "Noto Sans",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans CJK JP",
    "Helvetica",
    "Arial",
];

fn has_family(db: &fontdb::Database, name: &str) -> bool {
    db.faces()
        .any(|face| face.families.iter().any(|(family, _)| family == name))
}

/// Point the generic `sans-serif` family at a face that is actually
/// installed.
///
/// `load_system_fonts` does not consult fontconfig, so the generic names keep
/// fontdb's built-in defaults ("Arial" for sans-serif) even on hosts that
/// only ship DejaVu or Noto. Falls back to the first face in the database.
pub fn resolve_generic_sans(db: &mut fontdb::Database) {
    let current = db.family_name(&fontdb::Family::SansSerif).to_string();
    if has_family(db, &current) {
        return;
    }
    let replacement = INSTALLED_SANS_CANDIDATES
        .iter()
        .find(|name| has_family(db, name))
        .map(|name| name.to_string())
        .or_else(|| {
            db.faces()
                .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
        });
    if let Some(name) = replacement {
        debug!("generic sans-serif '{current}' not installed, using '{name}'");
        db.set_sans_serif_family(name);
    }
}

fn generic_family(name: &str) -> fontdb::Family<'_> {
    match name {
        "sans-serif" => fontdb::Family::SansSerif,
        "serif" => fontdb::Family::Serif,
        "monospace" => fontdb::Family::Monospace,
        "cursive" => fontdb::Family::Cursive,
        "fantasy" => fontdb::Family::Fantasy,
        other => fontdb::Family::Name(other),
    }
}

fn load_face(
    db: &fontdb::Database,
    family: &str,
    weight: FontWeight,
) -> Result<Option<fontdue::Font>, CardError> {
    let families = [generic_family(family)];
    let query = fontdb::Query {
        families: &families,
        weight: weight.fontdb(),
        stretch: fontdb::Stretch::Normal,
        style: fontdb::Style::Normal,
    };
    let Some(id) = db.query(&query) else {
        return Ok(None);
    };

    let loaded = db.with_face_data(id, |data, index| {
        fontdue::Font::from_bytes(
            data,
            fontdue::FontSettings {
                collection_index: index,
                scale: 40.0,
                load_substitutions: true,
            },
        )
    });

    match loaded {
        Some(Ok(face)) => Ok(Some(face)),
        Some(Err(e)) => {
            warn!("fontdue rejected '{family}': {e}");
            Err(CardError::FontLoad(family.to_string()))
        }
        None => Err(CardError::FontLoad(family.to_string())),
    }
}

fn css_family_list(families: &[String]) -> String {
    families
        .iter()
        .map(|f| match f.as_str() {
            "sans-serif" | "serif" | "monospace" | "cursive" | "fantasy" => f.clone(),
            name => format!("'{}'", name.replace('\'', "")),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
