use crate::fetcher::ElementGroup;
use crate::normalize::normalize_text;
use crate::selectors::PageSelectors;
use parkwait_model::{AttractionSnapshot, ScrapeMode};

/// Shape one fetch result into an [`AttractionSnapshot`].
///
/// A name or wait time whose selector matches nothing becomes an empty
/// string. Containers with an empty name are dropped. In
/// [`ScrapeMode::ScrapeOne`] only the first container whose name contains the
/// search word is kept; both sides are normalized before matching.
pub fn build_snapshot(
    groups: &[ElementGroup],
    selectors: &PageSelectors,
    mode: &ScrapeMode,
) -> AttractionSnapshot {
    let entries = groups.iter().filter_map(|group| {
        let name = group.text(&selectors.name).unwrap_or_default();
        if name.is_empty() {
            return None;
        }
        let wait = group.text(&selectors.waiting_time).unwrap_or_default();
        Some((name, wait))
    });

    match mode {
        ScrapeMode::ScrapeAll => entries.collect(),
        ScrapeMode::ScrapeOne { search_word } => {
            let needle = normalize_text(search_word);
            entries
                .filter(|(name, _)| name.contains(needle.as_str()))
                .take(1)
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(name: &str, wait: Option<&str>) -> ElementGroup {
        let wait_html = match wait {
            Some(w) => format!(r#"<div class="realtimeInformation"><span class="time">{w}</span></div>"#),
            None => String::new(),
        };
        ElementGroup::from_html(format!(
            r#"<div class="listTextArea"><h3 class="heading3">{name}</h3>{wait_html}</div>"#
        ))
    }

    #[test]
    fn test_build_all() {
        let groups = vec![
            container("Splash Mountain", Some("60")),
            container("Beast Castle", Some("90")),
        ];
        let snapshot = build_snapshot(&groups, &PageSelectors::default(), &ScrapeMode::ScrapeAll);
        assert_eq!(
            snapshot.iter().collect::<Vec<_>>(),
            vec![("Splash Mountain", "60"), ("Beast Castle", "90")]
        );
    }

    #[test]
    fn test_missing_wait_time_is_empty() {
        let groups = vec![container("Western River Railroad", None)];
        let snapshot = build_snapshot(&groups, &PageSelectors::default(), &ScrapeMode::ScrapeAll);
        assert_eq!(snapshot.get("Western River Railroad"), Some(""));
    }

    #[test]
    fn test_empty_names_excluded() {
        let groups = vec![
            container("", Some("5")),
            container("   ", Some("10")),
            ElementGroup::from_html(r#"<div class="listTextArea"><p>ad</p></div>"#),
            container("Jungle Cruise", Some("25")),
        ];
        let snapshot = build_snapshot(&groups, &PageSelectors::default(), &ScrapeMode::ScrapeAll);
        assert_eq!(snapshot.names().collect::<Vec<_>>(), vec!["Jungle Cruise"]);
    }

    #[test]
    fn test_no_groups_gives_empty_snapshot() {
        let snapshot = build_snapshot(&[], &PageSelectors::default(), &ScrapeMode::ScrapeAll);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_scrape_one() {
        let groups = vec![
            container("スプラッシュ・マウンテン", Some("60")),
            container("美女と野獣“魔法のものがたり”", Some("90")),
            container("美女と野獣 グリーティング", Some("30")),
        ];
        let mode = ScrapeMode::ScrapeOne {
            search_word: "美女と野獣".into(),
        };
        let snapshot = build_snapshot(&groups, &PageSelectors::default(), &mode);
        assert_eq!(
            snapshot.iter().collect::<Vec<_>>(),
            vec![("美女と野獣“魔法のものがたり”", "90")]
        );
    }

    #[test]
    fn test_scrape_one_normalizes_search_word() {
        let groups = vec![container("美女と野獣 “魔法のものがたり”", Some("90"))];
        for word in ["美女と野獣\u{3000}“魔法", "美女と野獣   “魔法", "美女と野獣\n“魔法"] {
            let mode = ScrapeMode::ScrapeOne {
                search_word: word.into(),
            };
            let snapshot = build_snapshot(&groups, &PageSelectors::default(), &mode);
            assert_eq!(snapshot.get("美女と野獣 “魔法のものがたり”"), Some("90"), "{word:?}");
        }

        // Decomposed ガ in the search word matches the composed heading.
        let groups = vec![container("ガジェットのゴーコースター", Some("20"))];
        let mode = ScrapeMode::ScrapeOne {
            search_word: "\u{30AB}\u{3099}ジェット".into(),
        };
        assert_eq!(build_snapshot(&groups, &PageSelectors::default(), &mode).len(), 1);
    }

    #[test]
    fn test_scrape_one_no_match() {
        let groups = vec![container("Splash Mountain", Some("60"))];
        let mode = ScrapeMode::ScrapeOne {
            search_word: "Castle".into(),
        };
        assert!(build_snapshot(&groups, &PageSelectors::default(), &mode).is_empty());
    }
}
