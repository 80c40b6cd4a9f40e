//! Fixed package parts: content types, relationships, document properties,
//! presentation, slide master, slide layout and theme.

use std::fmt::Write as FmtWrite;

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;

use crate::error::Result;
use crate::slide::{DocumentProperties, SlideSize};

use super::shape_xml::write_group_properties;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// XML namespaces.
pub mod namespace {
    pub const PML_MAIN: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
    pub const DML_MAIN: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
    pub const OFC_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    pub const OPC_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships";
    pub const OPC_CONTENT_TYPES: &str =
        "http://schemas.openxmlformats.org/package/2006/content-types";
    pub const OPC_CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
    pub const OFC_EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";
    pub const OFC_DOC_PROPS_VTYPES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes";
}

/// Part content types.
pub mod content_type {
    pub const OPC_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
    pub const OPC_CORE_PROPERTIES: &str =
        "application/vnd.openxmlformats-package.core-properties+xml";
    pub const OFC_EXTENDED_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.extended-properties+xml";
    pub const OFC_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
    pub const PML_PRESENTATION_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
    pub const PML_SLIDE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
    pub const PML_SLIDE_LAYOUT: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
    pub const PML_SLIDE_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
}

/// Relationship types.
pub mod relationship_type {
    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
}

/// First id of the slide id list, as PowerPoint numbers slides.
const FIRST_SLIDE_ID: u32 = 256;

/// Id of the single slide master. Master and layout ids share a space
/// starting at 2^31.
const SLIDE_MASTER_ID: u32 = 2_147_483_648;
const SLIDE_LAYOUT_ID: u32 = 2_147_483_649;

/// Zip member name of slide `index` (zero-based).
pub fn slide_part_name(index: usize) -> String {
    format!("ppt/slides/slide{}.xml", index + 1)
}

/// Relationship id of slide `index` in `presentation.xml.rels`.
///
/// `rId1` is the slide master; slides follow it.
pub fn slide_rel_id(index: usize) -> String {
    format!("rId{}", index + 2)
}

/// An ordered relationship list for one source part.
#[derive(Debug, Default)]
pub struct Relationships {
    rels: Vec<(String, &'static str, String)>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a relationship with the next free `rIdN` and return that id.
    pub fn add(&mut self, reltype: &'static str, target: impl Into<String>) -> String {
        let r_id = format!("rId{}", self.rels.len() + 1);
        self.rels.push((r_id.clone(), reltype, target.into()));
        r_id
    }

    pub fn len(&self) -> usize {
        self.rels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);
        xml.push_str(XML_DECLARATION);
        write!(xml, r#"<Relationships xmlns="{}">"#, namespace::OPC_RELATIONSHIPS)?;
        for (r_id, reltype, target) in &self.rels {
            write!(
                xml,
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                r_id,
                reltype,
                escape(target.as_str())
            )?;
        }
        xml.push_str("</Relationships>");
        Ok(xml)
    }
}

/// `_rels/.rels`
pub fn package_rels() -> Relationships {
    let mut rels = Relationships::new();
    rels.add(relationship_type::OFFICE_DOCUMENT, "ppt/presentation.xml");
    rels.add(relationship_type::CORE_PROPERTIES, "docProps/core.xml");
    rels.add(relationship_type::EXTENDED_PROPERTIES, "docProps/app.xml");
    rels
}

/// `ppt/_rels/presentation.xml.rels`: master, slides, then theme.
pub fn presentation_rels(slide_count: usize) -> Relationships {
    let mut rels = Relationships::new();
    rels.add(relationship_type::SLIDE_MASTER, "slideMasters/slideMaster1.xml");
    for index in 0..slide_count {
        rels.add(relationship_type::SLIDE, format!("slides/slide{}.xml", index + 1));
    }
    rels.add(relationship_type::THEME, "theme/theme1.xml");
    rels
}

/// `ppt/slideMasters/_rels/slideMaster1.xml.rels`
pub fn slide_master_rels() -> Relationships {
    let mut rels = Relationships::new();
    rels.add(relationship_type::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
    rels.add(relationship_type::THEME, "../theme/theme1.xml");
    rels
}

/// `ppt/slideLayouts/_rels/slideLayout1.xml.rels`
pub fn slide_layout_rels() -> Relationships {
    let mut rels = Relationships::new();
    rels.add(relationship_type::SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
    rels
}

/// `ppt/slides/_rels/slideN.xml.rels`: every slide uses the blank layout.
pub fn slide_rels() -> Relationships {
    let mut rels = Relationships::new();
    rels.add(relationship_type::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
    rels
}

/// `[Content_Types].xml`
pub fn content_types_xml(slide_count: usize) -> Result<String> {
    let mut xml = String::with_capacity(1536 + slide_count * 160);
    xml.push_str(XML_DECLARATION);
    write!(xml, r#"<Types xmlns="{}">"#, namespace::OPC_CONTENT_TYPES)?;
    write!(
        xml,
        r#"<Default Extension="rels" ContentType="{}"/>"#,
        content_type::OPC_RELATIONSHIPS
    )?;
    write!(xml, r#"<Default Extension="xml" ContentType="{}"/>"#, content_type::XML)?;

    let fixed = [
        ("/ppt/presentation.xml", content_type::PML_PRESENTATION_MAIN),
        ("/ppt/slideMasters/slideMaster1.xml", content_type::PML_SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml", content_type::PML_SLIDE_LAYOUT),
        ("/ppt/theme/theme1.xml", content_type::OFC_THEME),
        ("/docProps/core.xml", content_type::OPC_CORE_PROPERTIES),
        ("/docProps/app.xml", content_type::OFC_EXTENDED_PROPERTIES),
    ];
    for (part_name, ct) in fixed {
        write!(xml, r#"<Override PartName="{}" ContentType="{}"/>"#, part_name, ct)?;
    }
    for index in 0..slide_count {
        write!(
            xml,
            r#"<Override PartName="/{}" ContentType="{}"/>"#,
            slide_part_name(index),
            content_type::PML_SLIDE
        )?;
    }

    xml.push_str("</Types>");
    Ok(xml)
}

fn w3cdtf(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `docProps/core.xml`
pub fn core_properties_xml(props: &DocumentProperties) -> Result<String> {
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<cp:coreProperties xmlns:cp="{}" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
        namespace::OPC_CORE_PROPERTIES
    )?;

    let text_fields = [
        ("dc:title", &props.title),
        ("dc:subject", &props.subject),
        ("dc:creator", &props.author),
        ("cp:keywords", &props.keywords),
    ];
    for (tag, value) in text_fields {
        if let Some(value) = value {
            write!(xml, "<{0}>{1}</{0}>", tag, escape(value.as_str()))?;
        }
    }

    if let Some(created) = &props.created {
        write!(
            xml,
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>"#,
            w3cdtf(created)
        )?;
    }
    if let Some(modified) = props.modified.as_ref().or(props.created.as_ref()) {
        write!(
            xml,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{}</dcterms:modified>"#,
            w3cdtf(modified)
        )?;
    }

    xml.push_str("</cp:coreProperties>");
    Ok(xml)
}

/// `docProps/app.xml`
pub fn app_properties_xml(slide_count: usize) -> Result<String> {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<Properties xmlns="{}" xmlns:vt="{}">"#,
        namespace::OFC_EXTENDED_PROPERTIES,
        namespace::OFC_DOC_PROPS_VTYPES
    )?;
    write!(xml, "<Application>{}</Application>", env!("CARGO_PKG_NAME"))?;
    write!(xml, "<Slides>{}</Slides>", slide_count)?;
    xml.push_str("</Properties>");
    Ok(xml)
}

/// `ppt/presentation.xml`
pub fn presentation_xml(size: SlideSize, slide_count: usize) -> Result<String> {
    let mut xml = String::with_capacity(1024 + slide_count * 48);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1">"#,
        namespace::DML_MAIN,
        namespace::OFC_RELATIONSHIPS,
        namespace::PML_MAIN
    )?;

    xml.push_str("<p:sldMasterIdLst>");
    write!(xml, r#"<p:sldMasterId id="{}" r:id="rId1"/>"#, SLIDE_MASTER_ID)?;
    xml.push_str("</p:sldMasterIdLst>");

    if slide_count > 0 {
        xml.push_str("<p:sldIdLst>");
        for index in 0..slide_count {
            write!(
                xml,
                r#"<p:sldId id="{}" r:id="{}"/>"#,
                FIRST_SLIDE_ID + index as u32,
                slide_rel_id(index)
            )?;
        }
        xml.push_str("</p:sldIdLst>");
    }

    let (cx, cy) = size.to_emu();
    write!(xml, r#"<p:sldSz cx="{}" cy="{}"/>"#, cx, cy)?;
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("</p:presentation>");
    Ok(xml)
}

/// `ppt/slideMasters/slideMaster1.xml`
pub fn slide_master_xml() -> Result<String> {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        namespace::DML_MAIN,
        namespace::OFC_RELATIONSHIPS,
        namespace::PML_MAIN
    )?;
    xml.push_str("<p:cSld>");
    xml.push_str(r#"<p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#);
    xml.push_str("<p:spTree>");
    write_group_properties(&mut xml);
    xml.push_str("</p:spTree>");
    xml.push_str("</p:cSld>");
    xml.push_str(r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#);
    xml.push_str("<p:sldLayoutIdLst>");
    write!(xml, r#"<p:sldLayoutId id="{}" r:id="rId1"/>"#, SLIDE_LAYOUT_ID)?;
    xml.push_str("</p:sldLayoutIdLst>");

    xml.push_str("<p:txStyles>");
    xml.push_str(r#"<p:titleStyle><a:lvl1pPr algn="l"><a:defRPr sz="4400" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mj-lt"/><a:ea typeface="+mj-ea"/><a:cs typeface="+mj-cs"/></a:defRPr></a:lvl1pPr></p:titleStyle>"#);
    xml.push_str(r#"<p:bodyStyle><a:lvl1pPr algn="l"><a:defRPr sz="1800" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/><a:ea typeface="+mn-ea"/><a:cs typeface="+mn-cs"/></a:defRPr></a:lvl1pPr></p:bodyStyle>"#);
    xml.push_str(r#"<p:otherStyle><a:defPPr><a:defRPr lang="en-US"/></a:defPPr></p:otherStyle>"#);
    xml.push_str("</p:txStyles>");

    xml.push_str("</p:sldMaster>");
    Ok(xml)
}

/// `ppt/slideLayouts/slideLayout1.xml`: a blank layout with no placeholders.
pub fn slide_layout_xml() -> Result<String> {
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECLARATION);
    write!(
        xml,
        r#"<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="blank" preserve="1">"#,
        namespace::DML_MAIN,
        namespace::OFC_RELATIONSHIPS,
        namespace::PML_MAIN
    )?;
    xml.push_str(r#"<p:cSld name="Blank">"#);
    xml.push_str("<p:spTree>");
    write_group_properties(&mut xml);
    xml.push_str("</p:spTree>");
    xml.push_str("</p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sldLayout>");
    Ok(xml)
}

/// Theme colors in scheme order: dk1, lt1, dk2, lt2, accent1..6, hlink, folHlink.
const OFFICE_COLORS: [(&str, &str); 12] = [
    ("dk1", "000000"),
    ("lt1", "FFFFFF"),
    ("dk2", "44546A"),
    ("lt2", "E7E6E6"),
    ("accent1", "4472C4"),
    ("accent2", "ED7D31"),
    ("accent3", "A5A5A5"),
    ("accent4", "FFC000"),
    ("accent5", "5B9BD5"),
    ("accent6", "70AD47"),
    ("hlink", "0563C1"),
    ("folHlink", "954F72"),
];

/// `ppt/theme/theme1.xml`
///
/// `minor_font` is the body font; text boxes name their font explicitly,
/// so it only matters for text added later in an editor.
pub fn theme_xml(minor_font: &str) -> Result<String> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECLARATION);
    write!(xml, r#"<a:theme xmlns:a="{}" name="Office Theme">"#, namespace::DML_MAIN)?;
    xml.push_str("<a:themeElements>");

    xml.push_str(r#"<a:clrScheme name="Office">"#);
    for (slot, rgb) in OFFICE_COLORS {
        if slot == "dk1" || slot == "lt1" {
            let sys = if slot == "dk1" { "windowText" } else { "window" };
            write!(
                xml,
                r#"<a:{0}><a:sysClr val="{1}" lastClr="{2}"/></a:{0}>"#,
                slot, sys, rgb
            )?;
        } else {
            write!(xml, r#"<a:{0}><a:srgbClr val="{1}"/></a:{0}>"#, slot, rgb)?;
        }
    }
    xml.push_str("</a:clrScheme>");

    xml.push_str(r#"<a:fontScheme name="Office">"#);
    xml.push_str(r#"<a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#);
    write!(
        xml,
        r#"<a:minorFont><a:latin typeface="{}"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
        escape(minor_font)
    )?;
    xml.push_str("</a:fontScheme>");

    xml.push_str(r#"<a:fmtScheme name="Office">"#);
    xml.push_str("<a:fillStyleLst>");
    xml.push_str(r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#);
    xml.push_str(r#"<a:gradFill rotWithShape="1"><a:gsLst><a:gs pos="0"><a:schemeClr val="phClr"><a:tint val="50000"/><a:satMod val="300000"/></a:schemeClr></a:gs><a:gs pos="35000"><a:schemeClr val="phClr"><a:tint val="37000"/><a:satMod val="300000"/></a:schemeClr></a:gs><a:gs pos="100000"><a:schemeClr val="phClr"><a:tint val="15000"/><a:satMod val="350000"/></a:schemeClr></a:gs></a:gsLst><a:lin ang="16200000" scaled="1"/></a:gradFill>"#);
    xml.push_str(r#"<a:gradFill rotWithShape="1"><a:gsLst><a:gs pos="0"><a:schemeClr val="phClr"><a:shade val="51000"/><a:satMod val="130000"/></a:schemeClr></a:gs><a:gs pos="80000"><a:schemeClr val="phClr"><a:shade val="93000"/><a:satMod val="130000"/></a:schemeClr></a:gs><a:gs pos="100000"><a:schemeClr val="phClr"><a:shade val="94000"/><a:satMod val="135000"/></a:schemeClr></a:gs></a:gsLst><a:lin ang="16200000" scaled="0"/></a:gradFill>"#);
    xml.push_str("</a:fillStyleLst>");
    xml.push_str("<a:lnStyleLst>");
    xml.push_str(r#"<a:ln w="9525" cap="flat" cmpd="sng" algn="ctr"><a:solidFill><a:schemeClr val="phClr"><a:shade val="95000"/><a:satMod val="105000"/></a:schemeClr></a:solidFill><a:prstDash val="solid"/></a:ln>"#);
    xml.push_str(r#"<a:ln w="25400" cap="flat" cmpd="sng" algn="ctr"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:prstDash val="solid"/></a:ln>"#);
    xml.push_str(r#"<a:ln w="38100" cap="flat" cmpd="sng" algn="ctr"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:prstDash val="solid"/></a:ln>"#);
    xml.push_str("</a:lnStyleLst>");
    xml.push_str("<a:effectStyleLst>");
    for _ in 0..3 {
        xml.push_str("<a:effectStyle><a:effectLst/></a:effectStyle>");
    }
    xml.push_str("</a:effectStyleLst>");
    xml.push_str("<a:bgFillStyleLst>");
    xml.push_str(r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#);
    xml.push_str(r#"<a:solidFill><a:schemeClr val="phClr"><a:tint val="95000"/><a:satMod val="170000"/></a:schemeClr></a:solidFill>"#);
    xml.push_str(r#"<a:gradFill rotWithShape="1"><a:gsLst><a:gs pos="0"><a:schemeClr val="phClr"><a:tint val="93000"/><a:satMod val="150000"/></a:schemeClr></a:gs><a:gs pos="100000"><a:schemeClr val="phClr"><a:shade val="63000"/><a:satMod val="120000"/></a:schemeClr></a:gs></a:gsLst><a:lin ang="5400000" scaled="0"/></a:gradFill>"#);
    xml.push_str("</a:bgFillStyleLst>");
    xml.push_str("</a:fmtScheme>");

    xml.push_str("</a:themeElements>");
    xml.push_str("<a:objectDefaults/>");
    xml.push_str("<a:extraClrSchemeLst/>");
    xml.push_str("</a:theme>");
    Ok(xml)
}
