//! レキシコンの見出し（語形）
//!
//! [`Form`] は見出し形の形態素列・表層形の形態素列・両者に共通の素性からなります。
//! 構築は [`FormBuilder`] で行い、矛盾する指定は構築時にエラーになります。

use std::cmp::Ordering;
use std::fmt;

use crate::codec::{self, Analysis, FeatureMap, Morpheme};
use crate::errors::{MorphoError, Result};
use crate::relation::Relation;

/// レキシコンの見出し
///
/// すべてのフィールドは予約文字を含まないことが保証されています。
#[derive(Debug, Clone)]
pub struct Form {
    lemma: Vec<Morpheme>,
    morphemes: Vec<Morpheme>,
    features: FeatureMap,
}

fn validate_morphemes(morphemes: &[Morpheme]) -> Result<()> {
    for m in morphemes {
        codec::validate("segment", &m.segment)?;
        codec::validate("gloss", &m.gloss)?;
    }
    Ok(())
}

fn validate_features(features: &FeatureMap) -> Result<()> {
    for (key, value) in features {
        codec::validate("feature key", key)?;
        codec::validate("feature value", value)?;
    }
    Ok(())
}

fn join_segments(morphemes: &[Morpheme]) -> String {
    morphemes
        .iter()
        .map(|m| m.segment.trim_matches('-'))
        .collect()
}

impl Form {
    /// 語形を作成します。
    ///
    /// # エラー
    ///
    /// いずれかのフィールドに予約文字が含まれる場合、[`MorphoError::Encoding`] を返します。
    pub fn new(lemma: Vec<Morpheme>, morphemes: Vec<Morpheme>, features: FeatureMap) -> Result<Self> {
        validate_morphemes(&lemma)?;
        validate_morphemes(&morphemes)?;
        validate_features(&features)?;
        Ok(Self {
            lemma,
            morphemes,
            features,
        })
    }

    pub fn builder() -> FormBuilder {
        FormBuilder::default()
    }

    /// 表層形の形態素列
    pub fn morphemes(&self) -> &[Morpheme] {
        &self.morphemes
    }

    /// 見出し形の形態素列
    pub fn lemma_morphemes(&self) -> &[Morpheme] {
        &self.lemma
    }

    pub fn features(&self) -> &FeatureMap {
        &self.features
    }

    pub fn segmentation(&self) -> Vec<&str> {
        self.morphemes.iter().map(|m| m.segment.as_str()).collect()
    }

    pub fn gloss(&self) -> Vec<&str> {
        self.morphemes.iter().map(|m| m.gloss.as_str()).collect()
    }

    pub fn lemma_segmentation(&self) -> Vec<&str> {
        self.lemma.iter().map(|m| m.segment.as_str()).collect()
    }

    pub fn lemma_gloss(&self) -> Vec<&str> {
        self.lemma.iter().map(|m| m.gloss.as_str()).collect()
    }

    /// 表層形の文字列。各セグメントの前後の接続記号 `-` を除いて連結します。
    pub fn text(&self) -> String {
        join_segments(&self.morphemes)
    }

    /// 見出し形の文字列
    pub fn lemma_text(&self) -> String {
        join_segments(&self.lemma)
    }

    /// 素性の値を返します。
    pub fn get(&self, key: &str) -> Option<&str> {
        self.features.get(key).map(String::as_str)
    }

    /// 表層形の解析結果
    pub fn analysis(&self) -> Analysis {
        Analysis::new(self.morphemes.clone(), self.features.clone())
    }

    /// 見出し形の解析結果
    pub fn lemma_analysis(&self) -> Analysis {
        Analysis::new(self.lemma.clone(), self.features.clone())
    }

    /// 正準文字列の組 `(見出し形, 表層形)`
    pub fn to_strings(&self) -> (String, String) {
        (
            codec::write_canonical(&self.lemma, &self.features),
            codec::write_canonical(&self.morphemes, &self.features),
        )
    }

    /// 正準文字列の組から語形を復元します。素性は表層形の側から取られます。
    ///
    /// # エラー
    ///
    /// どちらかの文字列が正準文字列でない場合、[`MorphoError::Decode`] を返します。
    pub fn from_strings(top: &str, bottom: &str) -> Result<Self> {
        let lemma = codec::decode(top)?;
        let surface = codec::decode(bottom)?;
        Ok(Self {
            lemma: lemma.morphemes,
            morphemes: surface.morphemes,
            features: surface.features,
        })
    }

    /// 見出し形から表層形への1組だけからなる関係
    pub fn to_relation(&self) -> Result<Relation> {
        let (top, bottom) = self.to_strings();
        Relation::from_pair(&top, &bottom)
    }

    /// 1組だけからなる関係から語形を復元します。
    ///
    /// # エラー
    ///
    /// 関係がちょうど1組を含むのでない場合、[`MorphoError::InvalidArgument`] を返します。
    pub fn from_relation(relation: &Relation) -> Result<Self> {
        let paths: Vec<_> = relation.path_iterator(Some(2))?.collect();
        match paths.as_slice() {
            [(top, bottom)] => Self::from_strings(top, bottom),
            _ => Err(MorphoError::invalid_argument(
                "relation",
                format!("expected exactly one path, found {}", paths.len()),
            )),
        }
    }

    /// 表層形の形態素列を置き換えます。
    pub fn set_morphemes(&mut self, morphemes: Vec<Morpheme>) -> Result<()> {
        validate_morphemes(&morphemes)?;
        self.morphemes = morphemes;
        Ok(())
    }

    /// 見出し形の形態素列を置き換えます。
    pub fn set_lemma_morphemes(&mut self, lemma: Vec<Morpheme>) -> Result<()> {
        validate_morphemes(&lemma)?;
        self.lemma = lemma;
        Ok(())
    }

    /// 素性を置き換えます。
    pub fn set_features(&mut self, features: FeatureMap) -> Result<()> {
        validate_features(&features)?;
        self.features = features;
        Ok(())
    }

    fn sort_key(&self) -> (String, (String, String)) {
        (self.text(), self.to_strings())
    }
}

impl PartialEq for Form {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for Form {}

impl PartialOrd for Form {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Form {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// [`Form`] のビルダー
///
/// 各側の形態素は、形態素列で指定するか、セグメント列とグロス列の組で指定します。
/// 同じ側に両方の方法で指定すると [`FormBuilder::build`] はエラーを返します。
///
/// # 例
///
/// ```
/// use morpho::Form;
///
/// let form = Form::builder()
///     .lemma_segmentation(["run"])
///     .lemma_gloss(["run"])
///     .segmentation(["run", "-s"])
///     .gloss(["run", "3SG"])
///     .feature("pos", "V")
///     .build()?;
/// assert_eq!(form.text(), "runs");
/// assert_eq!(form.get("pos"), Some("V"));
/// # Ok::<(), morpho::errors::MorphoError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormBuilder {
    lemma_morphemes: Option<Vec<Morpheme>>,
    lemma_segmentation: Option<Vec<String>>,
    lemma_gloss: Option<Vec<String>>,
    morphemes: Option<Vec<Morpheme>>,
    segmentation: Option<Vec<String>>,
    gloss: Option<Vec<String>>,
    features: FeatureMap,
}

fn collect_strings<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

fn resolve_side(
    side: &'static str,
    morphemes: Option<Vec<Morpheme>>,
    segmentation: Option<Vec<String>>,
    gloss: Option<Vec<String>>,
) -> Result<Vec<Morpheme>> {
    if let Some(morphemes) = morphemes {
        if segmentation.is_some() || gloss.is_some() {
            return Err(MorphoError::invalid_argument(
                side,
                "morphemes cannot be combined with segmentation or gloss",
            ));
        }
        return Ok(morphemes);
    }
    let segmentation = segmentation.unwrap_or_default();
    let gloss = gloss.unwrap_or_default();
    if segmentation.len() != gloss.len() {
        return Err(MorphoError::invalid_argument(
            side,
            format!(
                "segmentation has {} items but gloss has {}",
                segmentation.len(),
                gloss.len()
            ),
        ));
    }
    Ok(segmentation
        .into_iter()
        .zip(gloss)
        .map(|(s, g)| Morpheme::new(s, g))
        .collect())
}

impl FormBuilder {
    pub fn lemma_morphemes(mut self, morphemes: Vec<Morpheme>) -> Self {
        self.lemma_morphemes = Some(morphemes);
        self
    }

    pub fn lemma_segmentation<I, S>(mut self, segmentation: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lemma_segmentation = Some(collect_strings(segmentation));
        self
    }

    pub fn lemma_gloss<I, S>(mut self, gloss: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lemma_gloss = Some(collect_strings(gloss));
        self
    }

    pub fn morphemes(mut self, morphemes: Vec<Morpheme>) -> Self {
        self.morphemes = Some(morphemes);
        self
    }

    pub fn segmentation<I, S>(mut self, segmentation: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.segmentation = Some(collect_strings(segmentation));
        self
    }

    pub fn gloss<I, S>(mut self, gloss: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.gloss = Some(collect_strings(gloss));
        self
    }

    pub fn features(mut self, features: FeatureMap) -> Self {
        self.features = features;
        self
    }

    pub fn feature<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.features.insert(key.into(), value.into());
        self
    }

    /// 語形を構築します。
    ///
    /// # エラー
    ///
    /// - 同じ側に形態素列とセグメント列・グロス列の両方が指定された場合、
    ///   またはセグメント列とグロス列の長さが異なる場合、[`MorphoError::InvalidArgument`] を返します。
    /// - フィールドに予約文字が含まれる場合、[`MorphoError::Encoding`] を返します。
    pub fn build(self) -> Result<Form> {
        let lemma = resolve_side(
            "lemma",
            self.lemma_morphemes,
            self.lemma_segmentation,
            self.lemma_gloss,
        )?;
        let morphemes = resolve_side("surface", self.morphemes, self.segmentation, self.gloss)?;
        Form::new(lemma, morphemes, self.features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_3sg() -> Form {
        Form::builder()
            .lemma_morphemes(vec![Morpheme::new("run", "run")])
            .segmentation(["run", "-s"])
            .gloss(["run", "3SG"])
            .feature("pos", "V")
            .build()
            .unwrap()
    }

    #[test]
    fn test_text_strips_connectors() {
        let form = run_3sg();
        assert_eq!(form.text(), "runs");
        assert_eq!(form.lemma_text(), "run");
        assert_eq!(form.to_string(), "runs");
    }

    #[test]
    fn test_to_strings() {
        let (top, bottom) = run_3sg().to_strings();
        assert_eq!(top, "^run(run)$pos(V)|");
        assert_eq!(bottom, "^run(run) -s(3SG)$pos(V)|");
    }

    #[test]
    fn test_from_strings_round_trip() {
        let form = run_3sg();
        let (top, bottom) = form.to_strings();
        assert_eq!(Form::from_strings(&top, &bottom).unwrap(), form);
    }

    #[test]
    fn test_relation_round_trip() {
        let form = run_3sg();
        let relation = form.to_relation().unwrap();
        assert_eq!(Form::from_relation(&relation).unwrap(), form);
        let two = relation.union(&run_3sg().to_relation().unwrap().invert());
        assert!(Form::from_relation(&two).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_conflicting_inputs() {
        let err = Form::builder()
            .morphemes(vec![Morpheme::new("a", "b")])
            .segmentation(["a"])
            .build()
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let err = Form::builder()
            .segmentation(["a", "b"])
            .gloss(["a"])
            .build()
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_reserved_characters() {
        let err = Form::builder()
            .segmentation(["a$"])
            .gloss(["a"])
            .build()
            .unwrap_err();
        assert!(err.is_encoding());
        let mut form = run_3sg();
        assert!(form
            .set_features([("k".to_string(), "v|".to_string())].into_iter().collect())
            .unwrap_err()
            .is_encoding());
    }

    #[test]
    fn test_ordering_by_text() {
        let a = Form::builder().segmentation(["ab"]).gloss(["x"]).build().unwrap();
        let b = Form::builder().segmentation(["b"]).gloss(["a"]).build().unwrap();
        assert!(a < b);
    }
}
