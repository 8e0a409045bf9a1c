//! 正準文字列の文法を表す、プロセス全体で共有される有限状態関係
//!
//! 文法はアルファベットごとに一度だけ構築され、以後は不変のまま共有されます。
//! キャッシュは解放されません。構築済みの [`Grammar`] は読み取り専用なので、
//! どのスレッドからでも参照できます。

use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock, Mutex};

use hashbrown::HashMap;

use crate::codec::{END, FEATURES_START, MORPHEMES_START, SEPARATOR, VALUE_CLOSE, VALUE_OPEN};
use crate::config::Alphabet;
use crate::fst::rewrite::{insert_after, insert_before};
use crate::fst::{ClosureKind, Fst};
use crate::relation::Relation;

static GRAMMARS: LazyLock<Mutex<HashMap<Alphabet, Arc<Grammar>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// アルファベット上の正準文字列の文法
pub struct Grammar {
    alphabet: Alphabet,
    sigma: BTreeSet<char>,
    letters: Relation,
    morph: Relation,
    sigma_star: Relation,
    region: Relation,
    seg_rewrite: Relation,
    gloss_rewrite: Relation,
}

impl Grammar {
    /// アルファベットに対応する文法を返します。初回の呼び出しでのみ構築されます。
    pub fn get(alphabet: &Alphabet) -> Arc<Grammar> {
        let mut grammars = GRAMMARS.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(grammar) = grammars.get(alphabet) {
            return Arc::clone(grammar);
        }
        log::debug!("building the canonical grammar for {alphabet:?}");
        let grammar = Arc::new(Self::build(alphabet));
        grammars.insert(alphabet.clone(), Arc::clone(&grammar));
        grammar
    }

    fn build(alphabet: &Alphabet) -> Self {
        let delimiters = [
            MORPHEMES_START,
            FEATURES_START,
            END,
            VALUE_OPEN,
            VALUE_CLOSE,
            SEPARATOR,
        ];
        let sigma: BTreeSet<char> = alphabet.chars().chain(delimiters).collect();
        let letters = Fst::symbol_class(alphabet.chars());
        let morph = letters.closure(ClosureKind::Star).optimize();
        let symbol = |c: char| Fst::symbol_class([c]);
        let chars = |cs: &[char]| cs.iter().copied().collect::<BTreeSet<char>>();

        // "^a b$" -> "^a(M) b(M)$"
        let morpheme_slot = symbol(VALUE_OPEN).concat(&morph).concat(&symbol(VALUE_CLOSE));
        let seg_rewrite = insert_before(&chars(&[FEATURES_START, SEPARATOR]), &morpheme_slot, &sigma);

        // "^a b$" -> "^(a) (b)$" -> "^M(a) M(b)$"
        let open = insert_after(&chars(&[MORPHEMES_START, SEPARATOR]), &symbol(VALUE_OPEN), &sigma);
        let close = insert_before(&chars(&[FEATURES_START, SEPARATOR]), &symbol(VALUE_CLOSE), &sigma);
        let segment = insert_before(&chars(&[VALUE_OPEN]), &morph, &sigma);
        let gloss_rewrite = open.compose(&close).compose(&segment).optimize();

        let region = Fst::symbol_class(alphabet.chars().chain([VALUE_OPEN, VALUE_CLOSE, SEPARATOR]))
            .closure(ClosureKind::Star)
            .optimize();
        let sigma_star = Fst::symbol_class(sigma.iter().copied())
            .closure(ClosureKind::Star)
            .optimize();

        Self {
            alphabet: alphabet.clone(),
            sigma,
            letters: Relation::from_fst(letters),
            morph: Relation::from_fst(morph),
            sigma_star: Relation::from_fst(sigma_star),
            region: Relation::from_fst(region),
            seg_rewrite: Relation::from_fst(seg_rewrite),
            gloss_rewrite: Relation::from_fst(gloss_rewrite),
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// アルファベットと区切り文字からなる記号集合
    pub fn sigma(&self) -> &BTreeSet<char> {
        &self.sigma
    }

    /// アルファベットの1文字
    pub fn letters(&self) -> &Relation {
        &self.letters
    }

    /// アルファベット上の任意の文字列（1つのセグメントやグロス）
    pub fn morph(&self) -> &Relation {
        &self.morph
    }

    /// 記号集合上の任意の文字列
    pub fn sigma_star(&self) -> &Relation {
        &self.sigma_star
    }

    /// 形態素領域または素性領域の中身として現れうる任意の文字列
    pub fn region(&self) -> &Relation {
        &self.region
    }

    /// `^seg1 seg2$` の各セグメントの後ろに任意のグロス `(M)` を挿入する書き換え
    pub fn seg_rewrite(&self) -> &Relation {
        &self.seg_rewrite
    }

    /// `^gloss1 gloss2$` の各グロスを括弧で囲み、前に任意のセグメントを挿入する書き換え
    pub fn gloss_rewrite(&self) -> &Relation {
        &self.gloss_rewrite
    }
}
