//! Slide and shape XML.

use std::fmt::Write as FmtWrite;

use quick_xml::escape::escape;

use crate::error::Result;
use crate::slide::{Frame, Paragraph, ShapePrimitive, Slide, SlideObject, TextBox};

use super::parts::namespace;

/// Font sizes are written in hundredths of a point.
fn size_to_hundredths(points: f64) -> u32 {
    (points * 100.0).round().clamp(100.0, 400_000.0) as u32
}

/// Generate `ppt/slides/slideN.xml`.
pub fn slide_xml(slide: &Slide) -> Result<String> {
    let mut xml = String::with_capacity(1024 + slide.len() * 640);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(
        xml,
        r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
        namespace::DML_MAIN,
        namespace::OFC_RELATIONSHIPS,
        namespace::PML_MAIN
    )?;
    xml.push_str("<p:cSld>");
    xml.push_str("<p:spTree>");
    write_group_properties(&mut xml);

    // id 1 belongs to the shape tree itself
    for (index, object) in slide.objects.iter().enumerate() {
        let id = index as u32 + 2;
        match object {
            SlideObject::TextBox(text_box) => write_text_box(&mut xml, id, text_box)?,
            SlideObject::Shape(shape) => write_shape(&mut xml, id, shape)?,
        }
    }

    xml.push_str("</p:spTree>");
    xml.push_str("</p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");

    Ok(xml)
}

pub(crate) fn write_group_properties(xml: &mut String) {
    xml.push_str("<p:nvGrpSpPr>");
    xml.push_str(r#"<p:cNvPr id="1" name=""/>"#);
    xml.push_str("<p:cNvGrpSpPr/>");
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvGrpSpPr>");
    xml.push_str("<p:grpSpPr>");
    xml.push_str("<a:xfrm>");
    xml.push_str(r#"<a:off x="0" y="0"/>"#);
    xml.push_str(r#"<a:ext cx="0" cy="0"/>"#);
    xml.push_str(r#"<a:chOff x="0" y="0"/>"#);
    xml.push_str(r#"<a:chExt cx="0" cy="0"/>"#);
    xml.push_str("</a:xfrm>");
    xml.push_str("</p:grpSpPr>");
}

fn write_xfrm(xml: &mut String, frame: &Frame) -> Result<()> {
    let (x, y, cx, cy) = frame.to_emu();
    xml.push_str("<a:xfrm>");
    write!(xml, r#"<a:off x="{}" y="{}"/>"#, x, y)?;
    write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, cx, cy)?;
    xml.push_str("</a:xfrm>");
    Ok(())
}

fn write_text_box(xml: &mut String, id: u32, text_box: &TextBox) -> Result<()> {
    xml.push_str("<p:sp>");
    xml.push_str("<p:nvSpPr>");
    write!(xml, r#"<p:cNvPr id="{}" name="TextBox {}"/>"#, id, id - 1)?;
    xml.push_str(r#"<p:cNvSpPr txBox="1"/>"#);
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvSpPr>");

    xml.push_str("<p:spPr>");
    write_xfrm(xml, &text_box.frame)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    xml.push_str("<a:noFill/>");
    xml.push_str("</p:spPr>");

    xml.push_str("<p:txBody>");
    xml.push_str(r#"<a:bodyPr wrap="square" rtlCol="0"/>"#);
    xml.push_str("<a:lstStyle/>");
    for paragraph in &text_box.paragraphs {
        write_paragraph(xml, paragraph)?;
    }
    xml.push_str("</p:txBody>");

    xml.push_str("</p:sp>");
    Ok(())
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph) -> Result<()> {
    xml.push_str("<a:p>");
    xml.push_str(r#"<a:pPr algn="l"/>"#);
    xml.push_str("<a:r>");
    write!(
        xml,
        r#"<a:rPr lang="en-US" sz="{}" dirty="0">"#,
        size_to_hundredths(paragraph.font_size)
    )?;
    // solidFill must precede latin inside rPr
    write!(
        xml,
        r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
        paragraph.color.to_hex()
    )?;
    write!(
        xml,
        r#"<a:latin typeface="{}"/>"#,
        escape(paragraph.font_name.as_str())
    )?;
    xml.push_str("</a:rPr>");
    write!(xml, "<a:t>{}</a:t>", escape(paragraph.text.as_str()))?;
    xml.push_str("</a:r>");
    xml.push_str("</a:p>");
    Ok(())
}

fn write_shape(xml: &mut String, id: u32, shape: &ShapePrimitive) -> Result<()> {
    xml.push_str("<p:sp>");
    xml.push_str("<p:nvSpPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="{} {}"/>"#,
        id,
        shape.preset.display_name(),
        id - 1
    )?;
    xml.push_str("<p:cNvSpPr/>");
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvSpPr>");

    xml.push_str("<p:spPr>");
    write_xfrm(xml, &shape.frame)?;
    write!(
        xml,
        r#"<a:prstGeom prst="{}"><a:avLst/></a:prstGeom>"#,
        shape.preset.prst()
    )?;
    xml.push_str("</p:spPr>");

    // Theme-styled outline and fill, as PowerPoint does for inserted shapes
    xml.push_str("<p:style>");
    xml.push_str(r#"<a:lnRef idx="2"><a:schemeClr val="accent1"><a:shade val="50000"/></a:schemeClr></a:lnRef>"#);
    xml.push_str(r#"<a:fillRef idx="1"><a:schemeClr val="accent1"/></a:fillRef>"#);
    xml.push_str(r#"<a:effectRef idx="0"><a:schemeClr val="accent1"/></a:effectRef>"#);
    xml.push_str(r#"<a:fontRef idx="minor"><a:schemeClr val="lt1"/></a:fontRef>"#);
    xml.push_str("</p:style>");

    xml.push_str("</p:sp>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slide::PresetShape;
    use crate::style::Rgb;

    fn paragraph(text: &str) -> Paragraph {
        Paragraph {
            text: text.to_string(),
            font_name: "Arial".to_string(),
            font_size: 12.0,
            color: Rgb::new(255, 0, 0),
        }
    }

    #[test]
    fn test_empty_slide() {
        let xml = slide_xml(&Slide::new()).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<p:spTree><p:nvGrpSpPr>"));
        assert!(!xml.contains("<p:sp>"));
        assert!(xml.ends_with("</p:sld>"));
    }

    #[test]
    fn test_text_box_xml() {
        let mut slide = Slide::new();
        slide.push(SlideObject::TextBox(TextBox {
            frame: Frame::new(1.0, 1.0, 1.0, 0.25),
            paragraphs: vec![paragraph("Fish & <Chips>")],
        }));

        let xml = slide_xml(&slide).unwrap();
        assert!(xml.contains(r#"<p:cNvPr id="2" name="TextBox 1"/>"#));
        assert!(xml.contains(r#"<p:cNvSpPr txBox="1"/>"#));
        assert!(xml.contains(r#"<a:off x="914400" y="914400"/>"#));
        assert!(xml.contains(r#"<a:ext cx="914400" cy="228600"/>"#));
        assert!(xml.contains(r#"sz="1200""#));
        assert!(xml.contains(r#"<a:solidFill><a:srgbClr val="FF0000"/></a:solidFill><a:latin typeface="Arial"/>"#));
        assert!(xml.contains("<a:t>Fish &amp; &lt;Chips&gt;</a:t>"));
    }

    #[test]
    fn test_shape_xml() {
        let mut slide = Slide::new();
        slide.push(SlideObject::Shape(ShapePrimitive {
            preset: PresetShape::IsoscelesTriangle,
            frame: Frame::new(1.0, 1.0, 2.0, 2.0),
        }));

        let xml = slide_xml(&slide).unwrap();
        assert!(xml.contains(r#"name="Isosceles Triangle 1""#));
        assert!(xml.contains(r#"<a:prstGeom prst="triangle"><a:avLst/></a:prstGeom>"#));
        assert!(xml.contains(r#"<a:ext cx="1828800" cy="1828800"/>"#));
    }

    #[test]
    fn test_shape_ids_are_unique() {
        let mut slide = Slide::new();
        for _ in 0..3 {
            slide.push(SlideObject::Shape(ShapePrimitive {
                preset: PresetShape::Rectangle,
                frame: Frame::default(),
            }));
        }
        let xml = slide_xml(&slide).unwrap();
        for id in 2..=4 {
            assert!(xml.contains(&format!(r#"<p:cNvPr id="{}""#, id)));
        }
    }

    #[test]
    fn test_fractional_font_size_rounds() {
        assert_eq!(size_to_hundredths(10.5), 1050);
        assert_eq!(size_to_hundredths(9.996), 1000);
        assert_eq!(size_to_hundredths(0.2), 100);
    }
}
