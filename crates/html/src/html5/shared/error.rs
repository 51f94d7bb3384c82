//! Parse errors for tokenization/tree-building.
//!
//! Errors are reported and accumulated; they never abort parsing. Any byte
//! stream produces a tree plus zero or more of these records.

/// Code identifying the recovered condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseErrorCode {
    // Tokenizer.
    UnexpectedNullCharacter,
    EofBeforeTagName,
    EofInTag,
    EofInComment,
    EofInDoctype,
    EofInCdata,
    EofInScriptHtmlCommentLikeText,
    InvalidFirstCharacterOfTagName,
    MissingEndTagName,
    EndTagWithAttributes,
    EndTagWithTrailingSolidus,
    UnexpectedQuestionMarkInsteadOfTagName,
    UnexpectedSolidusInTag,
    UnexpectedEqualsSignBeforeAttributeName,
    UnexpectedCharacterInAttributeName,
    UnexpectedCharacterInUnquotedAttributeValue,
    MissingAttributeValue,
    MissingWhitespaceBetweenAttributes,
    DuplicateAttribute,
    IncorrectlyOpenedComment,
    IncorrectlyClosedComment,
    AbruptClosingOfEmptyComment,
    NestedComment,
    MissingDoctypeName,
    MissingWhitespaceBeforeDoctypeName,
    InvalidCharacterSequenceAfterDoctypeName,
    MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
    MissingWhitespaceAfterDoctypePublicKeyword,
    MissingWhitespaceAfterDoctypeSystemKeyword,
    MissingQuoteBeforeDoctypePublicIdentifier,
    MissingQuoteBeforeDoctypeSystemIdentifier,
    AbruptDoctypePublicIdentifier,
    AbruptDoctypeSystemIdentifier,
    MissingDoctypePublicIdentifier,
    MissingDoctypeSystemIdentifier,
    UnexpectedCharacterAfterDoctypeSystemIdentifier,
    CdataInHtmlContent,
    // Character references.
    MissingSemicolonAfterCharacterReference,
    UnknownNamedCharacterReference,
    AbsenceOfDigitsInNumericCharacterReference,
    NullCharacterReference,
    CharacterReferenceOutsideUnicodeRange,
    SurrogateCharacterReference,
    ControlCharacterReference,
    NoncharacterCharacterReference,
    // Tree construction.
    MisplacedDoctype,
    UnexpectedStartTag,
    UnexpectedEndTag,
    UnexpectedEof,
    EndTagWithoutMatchingStartTag,
    MisnestedTag,
    UnexpectedTokenAfterBody,
    NonVoidHtmlElementStartTagWithTrailingSolidus,
}

/// One recovered parse condition, positioned as a byte offset into the
/// decoded input stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub code: ParseErrorCode,
    pub position: usize,
}

impl ParseError {
    pub fn new(code: ParseErrorCode, position: usize) -> Self {
        Self { code, position }
    }
}
