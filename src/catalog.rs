//! 静态假名表：平假名 + 片假名，清音 / 浊音 / 拗音。
//!
//! 每个条目的第一个读音是展示用的标准写法，其余为可接受的替代拼写。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KanaSet {
    Hiragana,
    Katakana,
}

impl KanaSet {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hiragana => "hiragana",
            Self::Katakana => "katakana",
        }
    }
}

/// 五十音的行，加上浊音与拗音两个分组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    A,
    Ka,
    Sa,
    Ta,
    Na,
    Ha,
    Ma,
    Ya,
    Ra,
    Wa,
    Dakuten,
    Combo,
}

impl Group {
    pub const ALL: [Group; 12] = [
        Group::A,
        Group::Ka,
        Group::Sa,
        Group::Ta,
        Group::Na,
        Group::Ha,
        Group::Ma,
        Group::Ya,
        Group::Ra,
        Group::Wa,
        Group::Dakuten,
        Group::Combo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "a",
            Self::Ka => "ka",
            Self::Sa => "sa",
            Self::Ta => "ta",
            Self::Na => "na",
            Self::Ha => "ha",
            Self::Ma => "ma",
            Self::Ya => "ya",
            Self::Ra => "ra",
            Self::Wa => "wa",
            Self::Dakuten => "dakuten",
            Self::Combo => "combo",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogItem {
    pub glyph: &'static str,
    pub readings: &'static [&'static str],
    pub group: Group,
    pub set: KanaSet,
}

impl CatalogItem {
    /// 标准读音（用于答错时的反馈）
    pub fn canonical(&self) -> &'static str {
        self.readings.first().copied().unwrap_or_default()
    }
}

const fn h(glyph: &'static str, readings: &'static [&'static str], group: Group) -> CatalogItem {
    CatalogItem {
        glyph,
        readings,
        group,
        set: KanaSet::Hiragana,
    }
}

const fn k(glyph: &'static str, readings: &'static [&'static str], group: Group) -> CatalogItem {
    CatalogItem {
        glyph,
        readings,
        group,
        set: KanaSet::Katakana,
    }
}

use Group::*;

static CATALOG: [CatalogItem; 208] = [
    // ---------------- 平假名 ----------------
    h("あ", &["a"], A),
    h("い", &["i"], A),
    h("う", &["u"], A),
    h("え", &["e"], A),
    h("お", &["o"], A),
    h("か", &["ka"], Ka),
    h("き", &["ki"], Ka),
    h("く", &["ku"], Ka),
    h("け", &["ke"], Ka),
    h("こ", &["ko"], Ka),
    h("さ", &["sa"], Sa),
    h("し", &["shi", "si"], Sa),
    h("す", &["su"], Sa),
    h("せ", &["se"], Sa),
    h("そ", &["so"], Sa),
    h("た", &["ta"], Ta),
    h("ち", &["chi", "ti"], Ta),
    h("つ", &["tsu", "tu"], Ta),
    h("て", &["te"], Ta),
    h("と", &["to"], Ta),
    h("な", &["na"], Na),
    h("に", &["ni"], Na),
    h("ぬ", &["nu"], Na),
    h("ね", &["ne"], Na),
    h("の", &["no"], Na),
    h("は", &["ha"], Ha),
    h("ひ", &["hi"], Ha),
    h("ふ", &["fu", "hu"], Ha),
    h("へ", &["he"], Ha),
    h("ほ", &["ho"], Ha),
    h("ま", &["ma"], Ma),
    h("み", &["mi"], Ma),
    h("む", &["mu"], Ma),
    h("め", &["me"], Ma),
    h("も", &["mo"], Ma),
    h("や", &["ya"], Ya),
    h("ゆ", &["yu"], Ya),
    h("よ", &["yo"], Ya),
    h("ら", &["ra"], Ra),
    h("り", &["ri"], Ra),
    h("る", &["ru"], Ra),
    h("れ", &["re"], Ra),
    h("ろ", &["ro"], Ra),
    h("わ", &["wa"], Wa),
    h("を", &["wo", "o"], Wa),
    h("ん", &["n"], Wa),
    // 浊音 / 半浊音
    h("が", &["ga"], Dakuten),
    h("ぎ", &["gi"], Dakuten),
    h("ぐ", &["gu"], Dakuten),
    h("げ", &["ge"], Dakuten),
    h("ご", &["go"], Dakuten),
    h("ざ", &["za"], Dakuten),
    h("じ", &["ji", "zi"], Dakuten),
    h("ず", &["zu"], Dakuten),
    h("ぜ", &["ze"], Dakuten),
    h("ぞ", &["zo"], Dakuten),
    h("だ", &["da"], Dakuten),
    h("ぢ", &["di", "ji", "dzi"], Dakuten),
    h("づ", &["du", "zu", "dzu"], Dakuten),
    h("で", &["de"], Dakuten),
    h("ど", &["do"], Dakuten),
    h("ば", &["ba"], Dakuten),
    h("び", &["bi"], Dakuten),
    h("ぶ", &["bu"], Dakuten),
    h("べ", &["be"], Dakuten),
    h("ぼ", &["bo"], Dakuten),
    h("ぱ", &["pa"], Dakuten),
    h("ぴ", &["pi"], Dakuten),
    h("ぷ", &["pu"], Dakuten),
    h("ぺ", &["pe"], Dakuten),
    h("ぽ", &["po"], Dakuten),
    // 拗音
    h("きゃ", &["kya"], Combo),
    h("きゅ", &["kyu"], Combo),
    h("きょ", &["kyo"], Combo),
    h("しゃ", &["sha", "sya"], Combo),
    h("しゅ", &["shu", "syu"], Combo),
    h("しょ", &["sho", "syo"], Combo),
    h("ちゃ", &["cha", "tya"], Combo),
    h("ちゅ", &["chu", "tyu"], Combo),
    h("ちょ", &["cho", "tyo"], Combo),
    h("にゃ", &["nya"], Combo),
    h("にゅ", &["nyu"], Combo),
    h("にょ", &["nyo"], Combo),
    h("ひゃ", &["hya"], Combo),
    h("ひゅ", &["hyu"], Combo),
    h("ひょ", &["hyo"], Combo),
    h("みゃ", &["mya"], Combo),
    h("みゅ", &["myu"], Combo),
    h("みょ", &["myo"], Combo),
    h("りゃ", &["rya"], Combo),
    h("りゅ", &["ryu"], Combo),
    h("りょ", &["ryo"], Combo),
    h("ぎゃ", &["gya"], Combo),
    h("ぎゅ", &["gyu"], Combo),
    h("ぎょ", &["gyo"], Combo),
    h("じゃ", &["ja", "jya", "zya"], Combo),
    h("じゅ", &["ju", "jyu", "zyu"], Combo),
    h("じょ", &["jo", "jyo", "zyo"], Combo),
    h("びゃ", &["bya"], Combo),
    h("びゅ", &["byu"], Combo),
    h("びょ", &["byo"], Combo),
    h("ぴゃ", &["pya"], Combo),
    h("ぴゅ", &["pyu"], Combo),
    h("ぴょ", &["pyo"], Combo),
    // ---------------- 片假名 ----------------
    k("ア", &["a"], A),
    k("イ", &["i"], A),
    k("ウ", &["u"], A),
    k("エ", &["e"], A),
    k("オ", &["o"], A),
    k("カ", &["ka"], Ka),
    k("キ", &["ki"], Ka),
    k("ク", &["ku"], Ka),
    k("ケ", &["ke"], Ka),
    k("コ", &["ko"], Ka),
    k("サ", &["sa"], Sa),
    k("シ", &["shi", "si"], Sa),
    k("ス", &["su"], Sa),
    k("セ", &["se"], Sa),
    k("ソ", &["so"], Sa),
    k("タ", &["ta"], Ta),
    k("チ", &["chi", "ti"], Ta),
    k("ツ", &["tsu", "tu"], Ta),
    k("テ", &["te"], Ta),
    k("ト", &["to"], Ta),
    k("ナ", &["na"], Na),
    k("ニ", &["ni"], Na),
    k("ヌ", &["nu"], Na),
    k("ネ", &["ne"], Na),
    k("ノ", &["no"], Na),
    k("ハ", &["ha"], Ha),
    k("ヒ", &["hi"], Ha),
    k("フ", &["fu", "hu"], Ha),
    k("ヘ", &["he"], Ha),
    k("ホ", &["ho"], Ha),
    k("マ", &["ma"], Ma),
    k("ミ", &["mi"], Ma),
    k("ム", &["mu"], Ma),
    k("メ", &["me"], Ma),
    k("モ", &["mo"], Ma),
    k("ヤ", &["ya"], Ya),
    k("ユ", &["yu"], Ya),
    k("ヨ", &["yo"], Ya),
    k("ラ", &["ra"], Ra),
    k("リ", &["ri"], Ra),
    k("ル", &["ru"], Ra),
    k("レ", &["re"], Ra),
    k("ロ", &["ro"], Ra),
    k("ワ", &["wa"], Wa),
    k("ヲ", &["wo", "o"], Wa),
    k("ン", &["n"], Wa),
    k("ガ", &["ga"], Dakuten),
    k("ギ", &["gi"], Dakuten),
    k("グ", &["gu"], Dakuten),
    k("ゲ", &["ge"], Dakuten),
    k("ゴ", &["go"], Dakuten),
    k("ザ", &["za"], Dakuten),
    k("ジ", &["ji", "zi"], Dakuten),
    k("ズ", &["zu"], Dakuten),
    k("ゼ", &["ze"], Dakuten),
    k("ゾ", &["zo"], Dakuten),
    k("ダ", &["da"], Dakuten),
    k("ヂ", &["di", "ji", "dzi"], Dakuten),
    k("ヅ", &["du", "zu", "dzu"], Dakuten),
    k("デ", &["de"], Dakuten),
    k("ド", &["do"], Dakuten),
    k("バ", &["ba"], Dakuten),
    k("ビ", &["bi"], Dakuten),
    k("ブ", &["bu"], Dakuten),
    k("ベ", &["be"], Dakuten),
    k("ボ", &["bo"], Dakuten),
    k("パ", &["pa"], Dakuten),
    k("ピ", &["pi"], Dakuten),
    k("プ", &["pu"], Dakuten),
    k("ペ", &["pe"], Dakuten),
    k("ポ", &["po"], Dakuten),
    k("キャ", &["kya"], Combo),
    k("キュ", &["kyu"], Combo),
    k("キョ", &["kyo"], Combo),
    k("シャ", &["sha", "sya"], Combo),
    k("シュ", &["shu", "syu"], Combo),
    k("ショ", &["sho", "syo"], Combo),
    k("チャ", &["cha", "tya"], Combo),
    k("チュ", &["chu", "tyu"], Combo),
    k("チョ", &["cho", "tyo"], Combo),
    k("ニャ", &["nya"], Combo),
    k("ニュ", &["nyu"], Combo),
    k("ニョ", &["nyo"], Combo),
    k("ヒャ", &["hya"], Combo),
    k("ヒュ", &["hyu"], Combo),
    k("ヒョ", &["hyo"], Combo),
    k("ミャ", &["mya"], Combo),
    k("ミュ", &["myu"], Combo),
    k("ミョ", &["myo"], Combo),
    k("リャ", &["rya"], Combo),
    k("リュ", &["ryu"], Combo),
    k("リョ", &["ryo"], Combo),
    k("ギャ", &["gya"], Combo),
    k("ギュ", &["gyu"], Combo),
    k("ギョ", &["gyo"], Combo),
    k("ジャ", &["ja", "jya", "zya"], Combo),
    k("ジュ", &["ju", "jyu", "zyu"], Combo),
    k("ジョ", &["jo", "jyo", "zyo"], Combo),
    k("ビャ", &["bya"], Combo),
    k("ビュ", &["byu"], Combo),
    k("ビョ", &["byo"], Combo),
    k("ピャ", &["pya"], Combo),
    k("ピュ", &["pyu"], Combo),
    k("ピョ", &["pyo"], Combo),
];

pub fn all() -> &'static [CatalogItem] {
    &CATALOG
}

pub fn find(glyph: &str) -> Option<&'static CatalogItem> {
    CATALOG.iter().find(|item| item.glyph == glyph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn glyphs_are_unique() {
        let mut seen = HashSet::new();
        for item in all() {
            assert!(seen.insert(item.glyph), "duplicate glyph {}", item.glyph);
        }
    }

    #[test]
    fn every_item_has_lowercase_readings() {
        for item in all() {
            assert!(!item.readings.is_empty(), "{} has no readings", item.glyph);
            for r in item.readings {
                assert_eq!(*r, r.to_lowercase());
                assert_eq!(*r, r.trim());
            }
        }
    }

    #[test]
    fn both_sets_have_the_same_shape() {
        let count = |set: KanaSet| all().iter().filter(|i| i.set == set).count();
        assert_eq!(count(KanaSet::Hiragana), 104);
        assert_eq!(count(KanaSet::Katakana), 104);
    }

    #[test]
    fn group_round_trips_through_str() {
        for g in Group::ALL {
            assert_eq!(Group::parse(g.as_str()), Some(g));
        }
        assert_eq!(Group::parse("xyz"), None);
    }

    #[test]
    fn canonical_is_first_reading() {
        let shi = find("し").unwrap();
        assert_eq!(shi.canonical(), "shi");
        assert_eq!(shi.readings, &["shi", "si"]);
    }
}
