//! Types about configuration.

#[cfg(feature = "config_serde")]
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt, str::FromStr};

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "config_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config_serde", serde(rename_all = "camelCase", default))]
/// The whole configuration of svelte_fmt.
pub struct FormatOptions {
    #[cfg_attr(feature = "config_serde", serde(flatten))]
    pub layout: LayoutOptions,
    #[cfg_attr(feature = "config_serde", serde(flatten))]
    pub language: LanguageOptions,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "config_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config_serde", serde(rename_all = "camelCase", default))]
/// Configuration related to layout, such as indentation or print width.
pub struct LayoutOptions {
    pub print_width: usize,
    pub use_tabs: bool,
    pub indent_width: usize,
    pub line_break: LineBreak,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            print_width: 80,
            use_tabs: false,
            indent_width: 2,
            line_break: LineBreak::Lf,
        }
    }
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "config_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config_serde", serde(rename_all = "camelCase"))]
pub enum LineBreak {
    #[default]
    Lf,
    Crlf,
}

impl From<LineBreak> for tiny_pretty::LineBreak {
    fn from(value: LineBreak) -> Self {
        match value {
            LineBreak::Lf => tiny_pretty::LineBreak::Lf,
            LineBreak::Crlf => tiny_pretty::LineBreak::Crlf,
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "config_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config_serde", serde(rename_all = "camelCase", default))]
/// Configuration related to syntax.
pub struct LanguageOptions {
    /// Put the `>` of a multi-line opening tag at the end of the last line
    /// instead of on a line of its own.
    pub closing_bracket_same_line: bool,

    /// Order of the top-level sections.
    pub sort_order: SortOrder,

    /// Quote attribute and directive values, as in `foo="{foo}"`.
    pub strict_svelte_attr: bool,

    /// Allow `{foo}` instead of `foo={foo}`, and `bind:foo` instead of `bind:foo={foo}`.
    pub svelte_attr_shorthand: bool,

    pub single_attribute_per_line: bool,

    pub script_indent: bool,
    pub style_indent: bool,

    pub whitespace_sensitivity: WhitespaceSensitivity,

    /// Prepend `<!-- @format -->` if the source doesn't have a pragma.
    pub insert_pragma: bool,

    /// The component is a code block inside a Markdown document,
    /// so the trailing line break is left to the host.
    pub embedded_in_markdown: bool,

    /// Comment text that skips formatting of the next node.
    /// Suffixed with `-start` and `-end`, it marks a skipped range of top-level nodes.
    pub ignore_comment_directive: String,
}

impl Default for LanguageOptions {
    fn default() -> Self {
        Self {
            closing_bracket_same_line: false,
            sort_order: SortOrder::default(),
            strict_svelte_attr: false,
            svelte_attr_shorthand: true,
            single_attribute_per_line: false,
            script_indent: true,
            style_indent: true,
            whitespace_sensitivity: WhitespaceSensitivity::default(),
            insert_pragma: false,
            embedded_in_markdown: false,
            ignore_comment_directive: "prettier-ignore".into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config_serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config_serde", serde(rename_all = "camelCase"))]
pub enum WhitespaceSensitivity {
    #[default]
    Css,
    Strict,
    Ignore,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Options,
    Scripts,
    Markup,
    Styles,
}

impl Section {
    fn as_str(self) -> &'static str {
        match self {
            Section::Options => "options",
            Section::Scripts => "scripts",
            Section::Markup => "markup",
            Section::Styles => "styles",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "config_serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum SortOrder {
    /// Keep sections where they are in the source.
    None,
    /// Print sections in this order. Always contains every section exactly once.
    Sections(Vec<Section>),
}

impl SortOrder {
    pub fn sections(&self) -> Option<&[Section]> {
        match self {
            SortOrder::None => None,
            SortOrder::Sections(sections) => Some(sections),
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Sections(vec![
            Section::Options,
            Section::Scripts,
            Section::Markup,
            Section::Styles,
        ])
    }
}

impl FromStr for SortOrder {
    type Err = SortOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "none" {
            return Ok(SortOrder::None);
        }
        let mut sections = Vec::with_capacity(4);
        for part in s.split('-') {
            let section = match part {
                "options" => Section::Options,
                "scripts" => Section::Scripts,
                "markup" => Section::Markup,
                "styles" => Section::Styles,
                _ => return Err(SortOrderError(s.to_owned())),
            };
            if sections.contains(&section) {
                return Err(SortOrderError(s.to_owned()));
            }
            sections.push(section);
        }
        if !sections.contains(&Section::Options) {
            sections.insert(0, Section::Options);
        }
        if sections.len() != 4 {
            return Err(SortOrderError(s.to_owned()));
        }
        Ok(SortOrder::Sections(sections))
    }
}

impl TryFrom<String> for SortOrder {
    type Error = SortOrderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortOrder> for String {
    fn from(value: SortOrder) -> Self {
        match value {
            SortOrder::None => "none".into(),
            SortOrder::Sections(sections) => sections
                .iter()
                .map(|section| section.as_str())
                .collect::<Vec<_>>()
                .join("-"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SortOrderError(String);

impl fmt::Display for SortOrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid sort order '{}': expected 'none' or a dash-separated list of \
             'options', 'scripts', 'markup' and 'styles'",
            self.0
        )
    }
}

impl Error for SortOrderError {}
