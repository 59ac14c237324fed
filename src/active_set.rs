use crate::catalog::CatalogItem;
use crate::model::Settings;

/// 按设置筛出当前要练习的假名，保持假名表原有顺序。空结果合法。
pub fn resolve<'a>(catalog: &'a [CatalogItem], settings: &Settings) -> Vec<&'a CatalogItem> {
    catalog
        .iter()
        .filter(|item| settings.set_enabled(item.set) && settings.groups.contains(&item.group))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{self, Group, KanaSet};
    use crate::model::SettingsPatch;

    #[test]
    fn default_settings_select_all_hiragana() {
        let items = resolve(catalog::all(), &Settings::default());
        assert_eq!(items.len(), 104);
        assert!(items.iter().all(|i| i.set == KanaSet::Hiragana));
        assert_eq!(items[0].glyph, "あ");
    }

    #[test]
    fn groups_and_sets_must_both_match() {
        let mut s = Settings::default();
        s.apply(SettingsPatch::groups([Group::Sa]));
        s.apply(SettingsPatch::katakana(true));
        let glyphs: Vec<&str> = resolve(catalog::all(), &s).iter().map(|i| i.glyph).collect();
        assert_eq!(
            glyphs,
            vec!["さ", "し", "す", "せ", "そ", "サ", "シ", "ス", "セ", "ソ"]
        );
    }

    #[test]
    fn nothing_enabled_is_empty() {
        let mut s = Settings::default();
        s.apply(SettingsPatch::hiragana(false));
        assert!(resolve(catalog::all(), &s).is_empty());

        let mut s = Settings::default();
        s.apply(SettingsPatch::groups([]));
        assert!(resolve(catalog::all(), &s).is_empty());
    }
}
