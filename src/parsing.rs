//! HTML parsing for DLsite product pages.
//!
//! Work pages and announce pages share the landmarks used here: the title in
//! `#work_name`, the maker in `#work_maker`, and the outline table
//! `#work_outline` whose rows are identified by their (localized) `th` label.
//! Title and maker are required; everything else is extracted by an
//! independent function returning `Option`, so a missing section only leaves
//! its field unset.

use crate::locale::{label_matches, Locale};
use crate::types::{AgeRating, Track, Work};
use crate::{DlsiteError, ProductCode, Result};
use scraper::{ElementRef, Html, Selector};

/// Stateless parser for DLsite product pages.
#[derive(Debug, Clone)]
pub struct WorkParser {
    locale: Locale,
    selectors: Selectors,
}

#[derive(Debug, Clone)]
struct Selectors {
    work_name: Selector,
    anchor: Selector,
    maker_link: Selector,
    maker_name: Selector,
    outline_row: Selector,
    th: Selector,
    td: Selector,
    main_genre_link: Selector,
    classed: Selector,
    description: Selector,
    tracklist: Selector,
    list_item: Selector,
    track_name: Selector,
    track_text: Selector,
    slider_image: Selector,
}

fn css(selector: &'static str) -> Selector {
    Selector::parse(selector).expect("static selector is valid")
}

impl Selectors {
    fn new() -> Self {
        Self {
            work_name: css("#work_name"),
            anchor: css("a"),
            maker_link: css("#work_maker .maker_name a"),
            maker_name: css("#work_maker .maker_name"),
            outline_row: css("#work_outline tr"),
            th: css("th"),
            td: css("td"),
            main_genre_link: css(".main_genre a"),
            classed: css("[class]"),
            description: css("#main_inner [itemprop=\"description\"]"),
            tracklist: css("#work_parts ol.work_tracklist_list"),
            list_item: css("li"),
            track_name: css("p.track_name"),
            track_text: css("p.track_text"),
            slider_image: css(".product-slider-data [data-src]"),
        }
    }
}

impl WorkParser {
    /// Create a parser for pages rendered in `locale`.
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            selectors: Selectors::new(),
        }
    }

    /// Parse raw page HTML into a [`Work`] for `code`.
    pub fn parse(&self, code: &ProductCode, html: &str) -> Result<Work> {
        let document = Html::parse_document(html);
        self.parse_document(code, &document)
    }

    /// Parse an already parsed document into a [`Work`] for `code`.
    pub fn parse_document(&self, code: &ProductCode, document: &Html) -> Result<Work> {
        let title = self.parse_title(document)?;
        let maker = self.parse_maker(document)?;
        let mut work = Work::new(code.clone(), title, maker);

        work.series = self.parse_series(document);
        work.description = self.parse_description(document);
        work.age = self.parse_age(document);
        work.genres = self.parse_genres(document);
        work.tracklist = self.parse_tracklist(document);
        work.images = self.parse_images(document);

        log::debug!(
            "Parsed {code}: series={:?} age={:?} genres={} tracks={} images={} description={}",
            work.series,
            work.age,
            work.genres.as_ref().map_or(0, Vec::len),
            work.tracklist.as_ref().map_or(0, Vec::len),
            work.images.len(),
            work.description.is_some(),
        );
        Ok(work)
    }

    /// Extract the work title from `#work_name`.
    ///
    /// Older and announce layouts wrap the title in a link, and some prefix
    /// it with label spans, so the last direct text node wins.
    pub fn parse_title(&self, document: &Html) -> Result<String> {
        let heading = document
            .select(&self.selectors.work_name)
            .next()
            .ok_or_else(|| DlsiteError::MalformedPage("Missing #work_name".to_string()))?;
        // Announce pages wrap the title in a link
        let element = heading
            .select(&self.selectors.anchor)
            .next()
            .unwrap_or(heading);

        let last_text = element
            .children()
            .filter_map(|node| node.value().as_text())
            .map(|text| text.trim())
            .filter(|text| !text.is_empty())
            .last();

        Ok(match last_text {
            Some(text) => text.to_string(),
            None => element.text().collect::<String>().trim().to_string(),
        })
    }

    /// Extract the maker (circle) name from `#work_maker`.
    pub fn parse_maker(&self, document: &Html) -> Result<String> {
        let element = document
            .select(&self.selectors.maker_link)
            .next()
            .or_else(|| document.select(&self.selectors.maker_name).next())
            .ok_or_else(|| {
                DlsiteError::MalformedPage("Missing #work_maker .maker_name".to_string())
            })?;
        Ok(element.text().collect::<String>().trim().to_string())
    }

    /// Find the `td` of the outline row whose label starts with `label`.
    fn outline_value<'a>(&self, document: &'a Html, label: &str) -> Option<ElementRef<'a>> {
        document.select(&self.selectors.outline_row).find_map(|row| {
            let th = row.select(&self.selectors.th).next()?;
            let th_text = th.text().collect::<String>();
            if !label_matches(&th_text, label) {
                return None;
            }
            row.select(&self.selectors.td).next()
        })
    }

    pub fn parse_series(&self, document: &Html) -> Option<String> {
        let td = self.outline_value(document, self.locale.labels().series)?;
        let series = match td.select(&self.selectors.anchor).next() {
            Some(link) => link.text().collect::<String>(),
            None => td.text().collect::<String>(),
        };
        let series = series.trim();
        if series.is_empty() {
            log::debug!("Series row present but empty");
            return None;
        }
        Some(series.to_string())
    }

    pub fn parse_age(&self, document: &Html) -> Option<AgeRating> {
        let td = self.outline_value(document, self.locale.labels().age)?;
        let age = td
            .select(&self.selectors.classed)
            .flat_map(|element| element.value().classes())
            .find_map(|class| match class {
                "icon_GEN" => Some(AgeRating::AllAges),
                "icon_R15" => Some(AgeRating::R15),
                "icon_ADL" => Some(AgeRating::R18),
                _ => None,
            });
        if age.is_none() {
            log::debug!("Age row present but no known rating icon");
        }
        age
    }

    pub fn parse_genres(&self, document: &Html) -> Option<Vec<String>> {
        let td = self.outline_value(document, self.locale.labels().genre)?;
        let mut links: Vec<ElementRef> = td.select(&self.selectors.main_genre_link).collect();
        if links.is_empty() {
            links = td.select(&self.selectors.anchor).collect();
        }
        Some(
            links
                .into_iter()
                .map(|link| link.text().collect::<String>().trim().to_string())
                .filter(|genre| !genre.is_empty())
                .collect(),
        )
    }

    /// Extract the description block.
    ///
    /// `<br>` separates fragments but never doubles a newline the text
    /// already has. Other elements contribute their text content.
    pub fn parse_description(&self, document: &Html) -> Option<String> {
        let container = document.select(&self.selectors.description).next()?;

        let mut text = String::new();
        let mut pending_break = false;
        for child in container.children() {
            // Text nodes are kept verbatim, including their own newlines
            let fragment = if let Some(fragment) = child.value().as_text() {
                let fragment: &str = fragment;
                fragment.to_string()
            } else if let Some(element) = ElementRef::wrap(child) {
                // Consecutive <br>s collapse into one pending break
                if element.value().name() == "br" {
                    pending_break = true;
                    continue;
                }
                log::debug!(
                    "Encountered unhandled tag <{}> in description",
                    element.value().name()
                );
                element.text().collect::<String>()
            } else {
                continue;
            };

            // The break only adds a newline if neither side already has one
            if pending_break {
                if !text.is_empty() && !text.ends_with('\n') && !fragment.starts_with('\n') {
                    text.push('\n');
                }
                pending_break = false;
            }
            text.push_str(&fragment);
        }

        // Exactly one trailing newline
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(format!("{text}\n"))
    }

    pub fn parse_tracklist(&self, document: &Html) -> Option<Vec<Track>> {
        // An empty list is still a tracklist; only a missing one is absent.
        let list = document.select(&self.selectors.tracklist).next()?;

        let mut tracks = Vec::new();
        for item in list.select(&self.selectors.list_item) {
            let name = item.select(&self.selectors.track_name).next();
            let text = item.select(&self.selectors.track_text).next();
            let (Some(name), Some(text)) = (name, text) else {
                log::debug!("Skipping tracklist entry without name or text");
                continue;
            };
            let name = name
                .text()
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            let text = text.text().collect::<String>().trim().to_string();
            tracks.push(Track { name, text });
        }
        Some(tracks)
    }

    pub fn parse_images(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.selectors.slider_image)
            .filter_map(|element| element.value().attr("data-src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(|src| {
                if src.starts_with("//") {
                    format!("https:{src}")
                } else {
                    src.to_string()
                }
            })
            .collect()
    }
}

impl Default for WorkParser {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
