//! Page locales and the outline labels DLsite uses for each of them.

use crate::{DlsiteError, Result};
use std::fmt;
use std::str::FromStr;

/// Locales DLsite can render product pages in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    Japanese,
    English,
    ChineseSimplified,
    ChineseTraditional,
    Korean,
}

/// Row labels in the `#work_outline` table for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineLabels {
    pub series: &'static str,
    pub genre: &'static str,
    pub age: &'static str,
}

const LABELS: [(Locale, OutlineLabels); 5] = [
    (
        Locale::Japanese,
        OutlineLabels {
            series: "シリーズ名",
            genre: "ジャンル",
            age: "年齢指定",
        },
    ),
    (
        Locale::English,
        OutlineLabels {
            series: "Series",
            genre: "Genre",
            age: "Age",
        },
    ),
    (
        Locale::ChineseSimplified,
        OutlineLabels {
            series: "系列名",
            genre: "分类",
            age: "年龄指定",
        },
    ),
    (
        Locale::ChineseTraditional,
        OutlineLabels {
            series: "系列名",
            genre: "分類",
            age: "年齡指定",
        },
    ),
    (
        Locale::Korean,
        OutlineLabels {
            series: "시리즈명",
            genre: "장르",
            age: "연령 지정",
        },
    ),
];

impl Locale {
    pub const ALL: [Locale; 5] = [
        Locale::Japanese,
        Locale::English,
        Locale::ChineseSimplified,
        Locale::ChineseTraditional,
        Locale::Korean,
    ];

    /// The tag DLsite uses in its `locale` query parameter.
    pub fn tag(self) -> &'static str {
        match self {
            Locale::Japanese => "ja_JP",
            Locale::English => "en_US",
            Locale::ChineseSimplified => "zh_CN",
            Locale::ChineseTraditional => "zh_TW",
            Locale::Korean => "ko_KR",
        }
    }

    pub fn labels(self) -> OutlineLabels {
        LABELS
            .iter()
            .find(|(locale, _)| *locale == self)
            .map(|(_, labels)| *labels)
            .unwrap_or(LABELS[0].1)
    }

    /// Whether this is the locale pages are served in without a query parameter.
    pub fn is_site_default(self) -> bool {
        self == Locale::Japanese
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = DlsiteError;

    fn from_str(s: &str) -> Result<Self> {
        Locale::ALL
            .into_iter()
            .find(|locale| locale.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| DlsiteError::InvalidLocale(s.to_string()))
    }
}

/// Check whether an outline row label is the given label.
///
/// Matching is anchored at the start of the label text so that label
/// prefixes inside unrelated labels do not match.
pub fn label_matches(text: &str, label: &str) -> bool {
    text.trim_start().starts_with(label)
}
