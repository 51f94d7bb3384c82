//! Foreign-content (SVG / MathML) adjustment tables.
//!
//! Read-only lookup tables applied when creating foreign elements: SVG tag
//! and attribute case fixes, the MathML `definitionURL` fix, and the
//! xlink/xml/xmlns attribute namespace split.

use crate::html5::shared::Attribute;
use crate::sink::{AttrNs, ElemAttr};
use crate::tags::TagId;

/// Restore the canonical mixed-case form of an SVG tag name.
pub(crate) fn adjust_svg_tag_name(name: &str) -> &str {
    match name {
        "altglyph" => "altGlyph",
        "altglyphdef" => "altGlyphDef",
        "altglyphitem" => "altGlyphItem",
        "animatecolor" => "animateColor",
        "animatemotion" => "animateMotion",
        "animatetransform" => "animateTransform",
        "clippath" => "clipPath",
        "feblend" => "feBlend",
        "fecolormatrix" => "feColorMatrix",
        "fecomponenttransfer" => "feComponentTransfer",
        "fecomposite" => "feComposite",
        "feconvolvematrix" => "feConvolveMatrix",
        "fediffuselighting" => "feDiffuseLighting",
        "fedisplacementmap" => "feDisplacementMap",
        "fedistantlight" => "feDistantLight",
        "fedropshadow" => "feDropShadow",
        "feflood" => "feFlood",
        "fefunca" => "feFuncA",
        "fefuncb" => "feFuncB",
        "fefuncg" => "feFuncG",
        "fefuncr" => "feFuncR",
        "fegaussianblur" => "feGaussianBlur",
        "feimage" => "feImage",
        "femerge" => "feMerge",
        "femergenode" => "feMergeNode",
        "femorphology" => "feMorphology",
        "feoffset" => "feOffset",
        "fepointlight" => "fePointLight",
        "fespecularlighting" => "feSpecularLighting",
        "fespotlight" => "feSpotLight",
        "fetile" => "feTile",
        "feturbulence" => "feTurbulence",
        "foreignobject" => "foreignObject",
        "glyphref" => "glyphRef",
        "lineargradient" => "linearGradient",
        "radialgradient" => "radialGradient",
        "textpath" => "textPath",
        other => other,
    }
}

/// Restore the canonical mixed-case form of an SVG attribute name.
pub(crate) fn adjust_svg_attr_name(name: &str) -> &str {
    match name {
        "attributename" => "attributeName",
        "attributetype" => "attributeType",
        "basefrequency" => "baseFrequency",
        "baseprofile" => "baseProfile",
        "calcmode" => "calcMode",
        "clippathunits" => "clipPathUnits",
        "diffuseconstant" => "diffuseConstant",
        "edgemode" => "edgeMode",
        "filterunits" => "filterUnits",
        "glyphref" => "glyphRef",
        "gradienttransform" => "gradientTransform",
        "gradientunits" => "gradientUnits",
        "kernelmatrix" => "kernelMatrix",
        "kernelunitlength" => "kernelUnitLength",
        "keypoints" => "keyPoints",
        "keysplines" => "keySplines",
        "keytimes" => "keyTimes",
        "lengthadjust" => "lengthAdjust",
        "limitingconeangle" => "limitingConeAngle",
        "markerheight" => "markerHeight",
        "markerunits" => "markerUnits",
        "markerwidth" => "markerWidth",
        "maskcontentunits" => "maskContentUnits",
        "maskunits" => "maskUnits",
        "numoctaves" => "numOctaves",
        "pathlength" => "pathLength",
        "patterncontentunits" => "patternContentUnits",
        "patterntransform" => "patternTransform",
        "patternunits" => "patternUnits",
        "pointsatx" => "pointsAtX",
        "pointsaty" => "pointsAtY",
        "pointsatz" => "pointsAtZ",
        "preservealpha" => "preserveAlpha",
        "preserveaspectratio" => "preserveAspectRatio",
        "primitiveunits" => "primitiveUnits",
        "refx" => "refX",
        "refy" => "refY",
        "repeatcount" => "repeatCount",
        "repeatdur" => "repeatDur",
        "requiredextensions" => "requiredExtensions",
        "requiredfeatures" => "requiredFeatures",
        "specularconstant" => "specularConstant",
        "specularexponent" => "specularExponent",
        "spreadmethod" => "spreadMethod",
        "startoffset" => "startOffset",
        "stddeviation" => "stdDeviation",
        "stitchtiles" => "stitchTiles",
        "surfacescale" => "surfaceScale",
        "systemlanguage" => "systemLanguage",
        "tablevalues" => "tableValues",
        "targetx" => "targetX",
        "targety" => "targetY",
        "textlength" => "textLength",
        "viewbox" => "viewBox",
        "viewtarget" => "viewTarget",
        "xchannelselector" => "xChannelSelector",
        "ychannelselector" => "yChannelSelector",
        "zoomandpan" => "zoomAndPan",
        other => other,
    }
}

/// Split a foreign attribute name into its namespace and local name.
fn foreign_attr_ns(name: &str) -> Option<(AttrNs, &str)> {
    match name {
        "xlink:actuate" | "xlink:arcrole" | "xlink:href" | "xlink:role" | "xlink:show"
        | "xlink:title" | "xlink:type" => Some((AttrNs::XLink, &name["xlink:".len()..])),
        "xml:lang" | "xml:space" => Some((AttrNs::Xml, &name["xml:".len()..])),
        "xmlns" => Some((AttrNs::XmlNs, "xmlns")),
        "xmlns:xlink" => Some((AttrNs::XmlNs, "xlink")),
        _ => None,
    }
}

/// Build the namespaced attribute list for an SVG element.
pub(crate) fn adjust_svg_attrs(attrs: &[Attribute]) -> Vec<ElemAttr> {
    attrs
        .iter()
        .map(|attr| match foreign_attr_ns(&attr.name) {
            Some((ns, local)) => ElemAttr {
                ns: Some(ns),
                name: local.to_string(),
                value: attr.value.clone(),
            },
            None => ElemAttr {
                ns: None,
                name: adjust_svg_attr_name(&attr.name).to_string(),
                value: attr.value.clone(),
            },
        })
        .collect()
}

/// Build the namespaced attribute list for a MathML element.
pub(crate) fn adjust_mathml_attrs(attrs: &[Attribute]) -> Vec<ElemAttr> {
    attrs
        .iter()
        .map(|attr| match foreign_attr_ns(&attr.name) {
            Some((ns, local)) => ElemAttr {
                ns: Some(ns),
                name: local.to_string(),
                value: attr.value.clone(),
            },
            None => ElemAttr {
                ns: None,
                name: if attr.name == "definitionurl" {
                    "definitionURL".to_string()
                } else {
                    attr.name.clone()
                },
                value: attr.value.clone(),
            },
        })
        .collect()
}

/// Start tags that break out of foreign content back into HTML.
pub(crate) fn is_breakout_tag(tag_id: TagId, name: &str, attrs: &[Attribute]) -> bool {
    use TagId::*;
    match tag_id {
        B | Big | Blockquote | Body | Br | Center | Code | Dd | Div | Dl | Dt | Em | Embed
        | H1 | H2 | H3 | H4 | H5 | H6 | Head | Hr | I | Img | Li | Listing | Menu | Meta
        | Nobr | Ol | P | Pre | Ruby | S | Small | Span | Strong | Strike | Table | Tt | U
        | Ul => true,
        Font => attrs
            .iter()
            .any(|a| matches!(a.name.as_str(), "color" | "face" | "size")),
        _ => matches!(name, "sub" | "sup" | "var"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html5::shared::Attribute;

    fn attr(name: &str, value: &str) -> Attribute {
        Attribute {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn svg_names_regain_mixed_case() {
        assert_eq!(adjust_svg_tag_name("foreignobject"), "foreignObject");
        assert_eq!(adjust_svg_attr_name("viewbox"), "viewBox");
        assert_eq!(adjust_svg_tag_name("circle"), "circle");
    }

    #[test]
    fn xlink_attributes_get_namespaced() {
        let adjusted = adjust_svg_attrs(&[attr("xlink:href", "#a"), attr("viewbox", "0 0 1 1")]);
        assert_eq!(adjusted[0].ns, Some(AttrNs::XLink));
        assert_eq!(adjusted[0].name, "href");
        assert_eq!(adjusted[1].ns, None);
        assert_eq!(adjusted[1].name, "viewBox");
    }

    #[test]
    fn mathml_definitionurl_is_fixed() {
        let adjusted = adjust_mathml_attrs(&[attr("definitionurl", "x")]);
        assert_eq!(adjusted[0].name, "definitionURL");
    }

    #[test]
    fn font_breaks_out_only_with_styling_attrs() {
        assert!(!is_breakout_tag(TagId::Font, "font", &[attr("id", "x")]));
        assert!(is_breakout_tag(TagId::Font, "font", &[attr("color", "red")]));
        assert!(is_breakout_tag(TagId::Div, "div", &[]));
        assert!(!is_breakout_tag(TagId::Other, "path", &[]));
    }
}
