//! Static tag-name lookup tables.
//!
//! `TagId` is the read-only tag-name→id map used by the tree constructor for
//! scope, auto-close, and boundary decisions. The table is fixed at compile
//! time; names outside it resolve to `TagId::Other` and keep their owned
//! string form on the token.

/// Identity of a known HTML/SVG/MathML tag name.
///
/// Matching is done on the ASCII-lowercased name. Foreign-content
/// case adjustments (`foreignObject`, ...) happen at element-creation time
/// and do not change the id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum TagId {
    A,
    Address,
    Applet,
    Area,
    Article,
    Aside,
    B,
    Base,
    Basefont,
    Bgsound,
    Big,
    Blockquote,
    Body,
    Br,
    Button,
    Caption,
    Center,
    Code,
    Col,
    Colgroup,
    Dd,
    Details,
    Dialog,
    Dir,
    Div,
    Dl,
    Dt,
    Em,
    Embed,
    Fieldset,
    Figcaption,
    Figure,
    Font,
    Footer,
    Form,
    Frame,
    Frameset,
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
    Head,
    Header,
    Hgroup,
    Hr,
    Html,
    I,
    Iframe,
    Image,
    Img,
    Input,
    Keygen,
    Li,
    Link,
    Listing,
    Main,
    Marquee,
    Menu,
    Meta,
    Nav,
    Nobr,
    Noembed,
    Noframes,
    Noscript,
    Object,
    Ol,
    Optgroup,
    Option,
    P,
    Param,
    Plaintext,
    Pre,
    Rb,
    Rp,
    Rt,
    Rtc,
    Ruby,
    S,
    Script,
    Section,
    Select,
    Small,
    Source,
    Span,
    Strike,
    Strong,
    Style,
    Summary,
    Table,
    Tbody,
    Td,
    Template,
    Textarea,
    Tfoot,
    Th,
    Thead,
    Title,
    Tr,
    Track,
    Tt,
    U,
    Ul,
    Wbr,
    Xmp,
    // Foreign (SVG / MathML) names the tree constructor must recognize.
    Svg,
    ForeignObject,
    Desc,
    Math,
    Mglyph,
    Malignmark,
    Mi,
    Mo,
    Mn,
    Ms,
    Mtext,
    AnnotationXml,
    /// Any tag name outside the static table.
    Other,
}

impl TagId {
    /// Resolve an ASCII-lowercased tag name to its id.
    pub fn from_name(name: &str) -> TagId {
        use TagId::*;
        match name {
            "a" => A,
            "address" => Address,
            "applet" => Applet,
            "area" => Area,
            "article" => Article,
            "aside" => Aside,
            "b" => B,
            "base" => Base,
            "basefont" => Basefont,
            "bgsound" => Bgsound,
            "big" => Big,
            "blockquote" => Blockquote,
            "body" => Body,
            "br" => Br,
            "button" => Button,
            "caption" => Caption,
            "center" => Center,
            "code" => Code,
            "col" => Col,
            "colgroup" => Colgroup,
            "dd" => Dd,
            "details" => Details,
            "dialog" => Dialog,
            "dir" => Dir,
            "div" => Div,
            "dl" => Dl,
            "dt" => Dt,
            "em" => Em,
            "embed" => Embed,
            "fieldset" => Fieldset,
            "figcaption" => Figcaption,
            "figure" => Figure,
            "font" => Font,
            "footer" => Footer,
            "form" => Form,
            "frame" => Frame,
            "frameset" => Frameset,
            "h1" => H1,
            "h2" => H2,
            "h3" => H3,
            "h4" => H4,
            "h5" => H5,
            "h6" => H6,
            "head" => Head,
            "header" => Header,
            "hgroup" => Hgroup,
            "hr" => Hr,
            "html" => Html,
            "i" => I,
            "iframe" => Iframe,
            "image" => Image,
            "img" => Img,
            "input" => Input,
            "keygen" => Keygen,
            "li" => Li,
            "link" => Link,
            "listing" => Listing,
            "main" => Main,
            "marquee" => Marquee,
            "menu" => Menu,
            "meta" => Meta,
            "nav" => Nav,
            "nobr" => Nobr,
            "noembed" => Noembed,
            "noframes" => Noframes,
            "noscript" => Noscript,
            "object" => Object,
            "ol" => Ol,
            "optgroup" => Optgroup,
            "option" => Option,
            "p" => P,
            "param" => Param,
            "plaintext" => Plaintext,
            "pre" => Pre,
            "rb" => Rb,
            "rp" => Rp,
            "rt" => Rt,
            "rtc" => Rtc,
            "ruby" => Ruby,
            "s" => S,
            "script" => Script,
            "section" => Section,
            "select" => Select,
            "small" => Small,
            "source" => Source,
            "span" => Span,
            "strike" => Strike,
            "strong" => Strong,
            "style" => Style,
            "summary" => Summary,
            "table" => Table,
            "tbody" => Tbody,
            "td" => Td,
            "template" => Template,
            "textarea" => Textarea,
            "tfoot" => Tfoot,
            "th" => Th,
            "thead" => Thead,
            "title" => Title,
            "tr" => Tr,
            "track" => Track,
            "tt" => Tt,
            "u" => U,
            "ul" => Ul,
            "wbr" => Wbr,
            "xmp" => Xmp,
            "svg" => Svg,
            "foreignobject" => ForeignObject,
            "desc" => Desc,
            "math" => Math,
            "mglyph" => Mglyph,
            "malignmark" => Malignmark,
            "mi" => Mi,
            "mo" => Mo,
            "mn" => Mn,
            "ms" => Ms,
            "mtext" => Mtext,
            "annotation-xml" => AnnotationXml,
            _ => Other,
        }
    }

    /// HTML void elements: no end tag, no children.
    pub fn is_void(self) -> bool {
        use TagId::*;
        matches!(
            self,
            Area | Base | Basefont | Bgsound | Br | Col | Embed | Frame | Hr | Img | Input
                | Keygen | Link | Meta | Param | Source | Track | Wbr
        )
    }

    /// Formatting elements tracked on the active formatting list.
    pub fn is_formatting(self) -> bool {
        use TagId::*;
        matches!(
            self,
            A | B | Big | Code | Em | Font | I | Nobr | S | Small | Strike | Strong | Tt | U
        )
    }

    /// "Special" category per the tree-construction algorithm (HTML namespace).
    pub fn is_special(self) -> bool {
        use TagId::*;
        matches!(
            self,
            Address | Applet | Area | Article | Aside | Base | Basefont | Bgsound | Blockquote
                | Body | Br | Button | Caption | Center | Col | Colgroup | Dd | Details | Dir
                | Div | Dl | Dt | Embed | Fieldset | Figcaption | Figure | Footer | Form | Frame
                | Frameset | H1 | H2 | H3 | H4 | H5 | H6 | Head | Header | Hgroup | Hr | Html
                | Iframe | Img | Input | Keygen | Li | Link | Listing | Main | Marquee | Menu
                | Meta | Nav | Noembed | Noframes | Noscript | Object | Ol | P | Param
                | Plaintext | Pre | Script | Section | Select | Source | Style | Summary | Table
                | Tbody | Td | Template | Textarea | Tfoot | Th | Thead | Title | Tr | Track
                | Ul | Wbr | Xmp
        )
    }

    /// Heading elements, which auto-close each other.
    pub fn is_heading(self) -> bool {
        use TagId::*;
        matches!(self, H1 | H2 | H3 | H4 | H5 | H6)
    }

    /// Table-section elements (`tbody`/`tfoot`/`thead`).
    pub fn is_table_section(self) -> bool {
        use TagId::*;
        matches!(self, Tbody | Tfoot | Thead)
    }

    /// Table cell elements (`td`/`th`).
    pub fn is_table_cell(self) -> bool {
        matches!(self, TagId::Td | TagId::Th)
    }
}

#[cfg(test)]
mod tests {
    use super::TagId;

    #[test]
    fn known_names_resolve_and_unknown_fall_through() {
        assert_eq!(TagId::from_name("div"), TagId::Div);
        assert_eq!(TagId::from_name("annotation-xml"), TagId::AnnotationXml);
        assert_eq!(TagId::from_name("x-custom-widget"), TagId::Other);
    }

    #[test]
    fn category_predicates_are_consistent() {
        assert!(TagId::Br.is_void());
        assert!(!TagId::Div.is_void());
        assert!(TagId::B.is_formatting());
        assert!(TagId::Table.is_special());
        assert!(!TagId::Span.is_special());
        assert!(TagId::H3.is_heading());
        assert!(TagId::Tfoot.is_table_section());
        assert!(TagId::Th.is_table_cell());
    }
}
