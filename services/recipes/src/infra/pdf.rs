use std::collections::BTreeMap;

use anyhow::Context as _;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, StringFormat, dictionary};
use ttf_parser::{Face, GlyphId};

use crate::domain::repository::ShoppingListRenderer;
use crate::domain::shopping_list::{LaidOutPage, PageLayout, PlacedLine, paginate};
use crate::domain::types::ShoppingListRow;
use crate::error::RecipesServiceError;

const FONT_RESOURCE: &str = "F1";
const FONT_NAME: &str = "DejaVuSans";
static FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Draws shopping lists as PDF with an embedded DejaVu Sans, so ingredient
/// names in any script the font covers come out as real text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfShoppingListRenderer {
    pub layout: PageLayout,
}

impl ShoppingListRenderer for PdfShoppingListRenderer {
    fn render(&self, rows: &[ShoppingListRow]) -> Result<Vec<u8>, RecipesServiceError> {
        let pages = paginate(rows, &self.layout);
        let mut font = EmbeddedFont::load()?;

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.new_object_id();
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_RESOURCE => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for page in &pages {
            let content = page_content(page, &self.layout, &mut font)
                .encode()
                .context("encode shopping list page")?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }
        font.write(&mut doc, font_id);

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    self.layout.width.into(),
                    self.layout.height.into(),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .context("write shopping list pdf")?;
        Ok(buffer)
    }
}

/// Every page sets its own font, so pages render independently.
fn page_content(
    page: &LaidOutPage,
    layout: &PageLayout,
    font: &mut EmbeddedFont,
) -> Content {
    let mut operations = Vec::new();
    if let Some(title) = &page.title {
        push_line(&mut operations, title, layout.title_size, font);
    }
    for line in &page.rows {
        push_line(&mut operations, line, layout.row_size, font);
    }
    Content { operations }
}

fn push_line(
    operations: &mut Vec<Operation>,
    line: &PlacedLine,
    size: f32,
    font: &mut EmbeddedFont,
) {
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new(
        "Tf",
        vec![FONT_RESOURCE.into(), size.into()],
    ));
    operations.push(Operation::new("Td", vec![line.x.into(), line.y.into()]));
    operations.push(Operation::new(
        "Tj",
        vec![Object::String(font.encode(&line.text), StringFormat::Hexadecimal)],
    ));
    operations.push(Operation::new("ET", vec![]));
}

/// TrueType font shown through an `Identity-H` Type0 font: text is written as
/// two-byte glyph ids and a ToUnicode map turns them back into characters.
struct EmbeddedFont {
    face: Face<'static>,
    /// Glyphs drawn so far, with the character each one stands for.
    used: BTreeMap<u16, char>,
}

impl EmbeddedFont {
    fn load() -> Result<Self, RecipesServiceError> {
        let face = Face::parse(FONT_DATA, 0).context("parse embedded font")?;
        Ok(Self {
            face,
            used: BTreeMap::new(),
        })
    }

    /// Big-endian glyph ids for `text`. Characters without a glyph map to
    /// `.notdef` (glyph 0).
    fn encode(&mut self, text: &str) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(text.len() * 2);
        for c in text.chars() {
            let GlyphId(gid) = self.face.glyph_index(c).unwrap_or(GlyphId(0));
            if gid != 0 {
                self.used.entry(gid).or_insert(c);
            }
            bytes.extend_from_slice(&gid.to_be_bytes());
        }
        bytes
    }

    /// Font units to PDF glyph space (1000 per em).
    fn scale(&self, units: impl Into<f32>) -> i64 {
        let per_em = f32::from(self.face.units_per_em().max(1));
        (units.into() * 1000.0 / per_em).round() as i64
    }

    fn advance(&self, gid: u16) -> i64 {
        self.scale(self.face.glyph_hor_advance(GlyphId(gid)).unwrap_or_default())
    }

    /// Store the font program and its dictionaries, with the Type0 font at `font_id`.
    fn write(self, doc: &mut Document, font_id: ObjectId) {
        let bbox = self.face.global_bounding_box();
        let ascent = self.scale(self.face.ascender());
        let file_id = doc.add_object(Stream::new(
            dictionary! { "Length1" => FONT_DATA.len() as i64 },
            FONT_DATA.to_vec(),
        ));
        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => FONT_NAME,
            "Flags" => 32,
            "FontBBox" => vec![
                self.scale(bbox.x_min).into(),
                self.scale(bbox.y_min).into(),
                self.scale(bbox.x_max).into(),
                self.scale(bbox.y_max).into(),
            ],
            "ItalicAngle" => 0,
            "Ascent" => ascent,
            "Descent" => self.scale(self.face.descender()),
            "CapHeight" => self.face.capital_height().map_or(ascent, |h| self.scale(h)),
            "StemV" => 80,
            "FontFile2" => file_id,
        });

        let mut widths: Vec<Object> = Vec::with_capacity(self.used.len() * 2);
        for &gid in self.used.keys() {
            widths.push(i64::from(gid).into());
            widths.push(Object::Array(vec![self.advance(gid).into()]));
        }
        let descendant_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => FONT_NAME,
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "FontDescriptor" => descriptor_id,
            "W" => widths,
            "CIDToGIDMap" => "Identity",
        });

        let to_unicode_id = doc.add_object(Stream::new(
            dictionary! {},
            to_unicode_cmap(&self.used).into_bytes(),
        ));
        doc.objects.insert(
            font_id,
            Object::Dictionary(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type0",
                "BaseFont" => FONT_NAME,
                "Encoding" => "Identity-H",
                "DescendantFonts" => vec![descendant_id.into()],
                "ToUnicode" => to_unicode_id,
            }),
        );
    }
}

/// CMap from two-byte glyph ids back to UTF-16, in `bfchar` blocks of at
/// most 100 entries.
fn to_unicode_cmap(used: &BTreeMap<u16, char>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );
    let entries: Vec<(&u16, &char)> = used.iter().collect();
    for block in entries.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", block.len()));
        for (gid, c) in block {
            let mut units = [0u16; 2];
            let target: String = c
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("{unit:04X}"))
                .collect();
            cmap.push_str(&format!("<{gid:04X}> <{target}>\n"));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
    );
    cmap
}
