use std::io::{Seek, SeekFrom};

use crate::codec::Morpheme;
use crate::config::Alphabet;
use crate::form::Form;
use crate::lexicon::Lexicon;
use crate::query::Query;
use crate::relation::Relation;
use crate::rules;

fn noun(stem: &str, plural: &str) -> Form {
    Form::builder()
        .lemma_segmentation([stem])
        .lemma_gloss([stem])
        .segmentation([stem, plural])
        .gloss([stem, "PL"])
        .feature("pos", "N")
        .feature("num", "pl")
        .build()
        .unwrap()
}

fn verb(stem: &str) -> Form {
    Form::builder()
        .lemma_segmentation([stem])
        .lemma_gloss([stem])
        .segmentation([stem])
        .gloss([stem])
        .feature("pos", "V")
        .build()
        .unwrap()
}

fn sample() -> Vec<Form> {
    vec![noun("dog", "-s"), noun("ox", "-en"), verb("run"), verb("walk")]
}

#[test]
fn test_insertion_order_does_not_matter() {
    let mut forward = Lexicon::new();
    forward.extend(&sample()).unwrap();
    let mut backward = Lexicon::new();
    backward.extend(sample().iter().rev()).unwrap();
    assert_eq!(forward, backward);
    assert_eq!(forward.entries().unwrap(), backward.entries().unwrap());
}

#[test]
fn test_adding_an_entry_twice_is_idempotent() {
    let mut lexicon = Lexicon::new();
    lexicon.add_entry(&verb("run")).unwrap();
    lexicon.add_entry(&verb("run")).unwrap();
    assert_eq!(lexicon.len().unwrap(), 1);
}

#[test]
fn test_query_by_segmentation() {
    let mut lexicon = Lexicon::new();
    lexicon.extend(&sample()).unwrap();
    let forms = lexicon.query(&Query::new().segmentation(["ox", "-en"])).unwrap();
    assert_eq!(forms, vec![noun("ox", "-en")]);
    assert_eq!(forms[0].text(), "oxen");
    assert!(lexicon
        .query(&Query::new().segmentation(["ox"]))
        .unwrap()
        .is_empty());
}

#[test]
fn test_query_by_gloss() {
    let mut lexicon = Lexicon::new();
    lexicon.extend(&sample()).unwrap();
    let texts: Vec<_> = lexicon
        .query(&Query::new().gloss(["dog", "PL"]))
        .unwrap()
        .iter()
        .map(Form::text)
        .collect();
    assert_eq!(texts, vec!["dogs"]);
}

#[test]
fn test_query_by_features() {
    let mut lexicon = Lexicon::new();
    lexicon.extend(&sample()).unwrap();
    let verbs: Vec<_> = lexicon
        .query(&Query::new().feature("pos", "V"))
        .unwrap()
        .iter()
        .map(Form::text)
        .collect();
    assert_eq!(verbs, vec!["run", "walk"]);
    let nouns = lexicon
        .query(&Query::new().feature("pos", "N").feature("num", "pl"))
        .unwrap();
    assert_eq!(nouns.len(), 2);
    assert!(lexicon
        .query(&Query::new().feature("pos", "N"))
        .unwrap()
        .is_empty());
}

#[test]
fn test_query_by_lemma() {
    let mut lexicon = Lexicon::new();
    lexicon.extend(&sample()).unwrap();
    let forms = lexicon
        .query(&Query::new().lemma_segmentation(["dog"]))
        .unwrap();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].lemma_text(), "dog");
    assert_eq!(forms[0].segmentation(), vec!["dog", "-s"]);
}

#[test]
fn test_suffix_rule() {
    let mut lexicon = Lexicon::new();
    lexicon
        .add_entry(
            &Form::builder()
                .lemma_morphemes(vec![Morpheme::new("run", "run")])
                .morphemes(vec![Morpheme::new("run", "run")])
                .build()
                .unwrap(),
        )
        .unwrap();
    let rule = rules::suffix(lexicon.alphabet(), &[Morpheme::new("ed", "PAST")]).unwrap();
    lexicon.add_rule(&rule);

    let forms = lexicon
        .query(&Query::new().lemma_segmentation(["run"]))
        .unwrap();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].text(), "runed");
    assert_eq!(forms[0].gloss(), vec!["run", "PAST"]);
    assert_eq!(forms[0].lemma_gloss(), vec!["run"]);
}

#[test]
fn test_conditional_rule() {
    let mut lexicon = Lexicon::new();
    lexicon.extend([verb("run"), verb("walk")].iter()).unwrap();
    let alphabet = lexicon.alphabet().clone();
    let rule = rules::when(&alphabet, &Query::new().segmentation(["walk"]))
        .unwrap()
        .then(&rules::prefix(&alphabet, &[Morpheme::new("re-", "AGAIN")]).unwrap());
    lexicon.add_rule(&rule);
    let texts: Vec<_> = lexicon.entries().unwrap().iter().map(Form::text).collect();
    assert_eq!(texts, vec!["rewalk", "run"]);
}

#[test]
fn test_cyclic_lexicon_is_guarded() {
    let mut lexicon = Lexicon::new();
    lexicon.add_entry(&verb("run")).unwrap();
    let repeat = Relation::acceptor("^run(run)")
        .unwrap()
        .concatenate(&Relation::from_pair("", " a(A)").unwrap().star())
        .concatenate(&Relation::acceptor("$pos(V)|").unwrap());
    lexicon.add_rule(&repeat);

    assert!(lexicon.relation().is_cyclic());
    assert!(lexicon.query(&Query::new()).unwrap_err().is_cyclic_language());
    assert!(lexicon.entries().unwrap_err().is_cyclic_language());
    let display = lexicon.to_string();
    assert!(display.starts_with("run\n^run(run)$pos(V)|\n^run(run)$pos(V)|\n"));
    assert!(display.ends_with("\n...\n"));
}

#[test]
fn test_other_alphabet() {
    let alphabet = Alphabet::default().with_chars("äöü".chars()).unwrap();
    let mut lexicon = Lexicon::with_alphabet(alphabet);
    lexicon.add_entry(&verb("kühl")).unwrap();
    let forms = lexicon.query(&Query::new().segmentation(["kühl"])).unwrap();
    assert_eq!(forms.len(), 1);
    assert!(Lexicon::new().add_entry(&verb("kühl")).unwrap_err().is_encoding());
}

#[test]
fn test_persistence_round_trip() {
    let alphabet = Alphabet::default().with_chars("é".chars()).unwrap();
    let mut lexicon = Lexicon::with_alphabet(alphabet);
    lexicon.extend(&sample()).unwrap();
    lexicon.add_entry(&verb("café")).unwrap();

    let mut file = tempfile::tempfile().unwrap();
    lexicon.write(&mut file).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    let loaded = Lexicon::read(&mut file).unwrap();

    assert_eq!(loaded, lexicon);
    assert_eq!(loaded.alphabet(), lexicon.alphabet());
    assert_eq!(loaded.entries().unwrap(), lexicon.entries().unwrap());
}

#[test]
fn test_read_rejects_relation_files() {
    let relation = Relation::new("abc").unwrap();
    let mut buf = vec![];
    relation.write(&mut buf).unwrap();
    assert!(matches!(
        Lexicon::read(buf.as_slice()).unwrap_err(),
        crate::MorphoError::InvalidFormat(_)
    ));
}
