use lyric_topics::data::{
    dedup::deduplicate,
    excerpts::{excerpt_tag, ExcerptRecord},
};
use proptest::prelude::*;

fn excerpt(song: &str, position: usize, text: &str) -> ExcerptRecord {
    ExcerptRecord {
        ranking_posicao: Some(1),
        titulo: format!("Título {song}"),
        tag_musica: song.to_string(),
        tag_trecho: excerpt_tag(song, position),
        letra: text.to_string(),
        artista: "Artista".into(),
        ano: Some(2023),
        contagem_palavras: text.split_whitespace().count(),
    }
}

fn texts_and_tags(excerpts: &[ExcerptRecord]) -> Vec<(&str, &str)> {
    excerpts
        .iter()
        .map(|e| (e.letra.as_str(), e.tag_trecho.as_str()))
        .collect()
}

#[test]
fn first_occurrence_wins() {
    let input = vec![
        excerpt("musica1", 1, "oi"),
        excerpt("musica1", 2, "tchau"),
        excerpt("musica1", 3, "oi"),
    ];
    let outcome = deduplicate(&input);
    assert_eq!(
        texts_and_tags(&outcome.excerpts),
        vec![("oi", "musica1_excerpt1"), ("tchau", "musica1_excerpt2")]
    );
    assert_eq!(outcome.summary.removed, 1);
}

#[test]
fn renumbering_closes_gaps() {
    let input = vec![
        excerpt("musica1", 1, "a"),
        excerpt("musica1", 2, "a"),
        excerpt("musica1", 3, "b"),
        excerpt("musica1", 4, "a"),
        excerpt("musica1", 5, "c"),
    ];
    let outcome = deduplicate(&input);
    assert_eq!(
        texts_and_tags(&outcome.excerpts),
        vec![
            ("a", "musica1_excerpt1"),
            ("b", "musica1_excerpt2"),
            ("c", "musica1_excerpt3"),
        ]
    );
}

#[test]
fn identical_text_in_different_songs_is_kept() {
    let input = vec![excerpt("musica1", 1, "oi"), excerpt("musica2", 1, "oi")];
    let outcome = deduplicate(&input);
    assert_eq!(outcome.excerpts.len(), 2);
    assert_eq!(outcome.summary.removed, 0);
    assert!(outcome.summary.per_song.is_empty());
}

#[test]
fn comparison_is_exact() {
    let input = vec![
        excerpt("musica1", 1, "Oi"),
        excerpt("musica1", 2, "oi"),
        excerpt("musica1", 3, "oi "),
    ];
    let outcome = deduplicate(&input);
    assert_eq!(outcome.excerpts.len(), 3);
}

#[test]
fn original_positions_decide_order_not_row_order() {
    let input = vec![
        excerpt("musica1", 3, "oi"),
        excerpt("musica1", 1, "oi"),
        excerpt("musica1", 2, "tchau"),
    ];
    let outcome = deduplicate(&input);
    assert_eq!(
        texts_and_tags(&outcome.excerpts),
        vec![("oi", "musica1_excerpt1"), ("tchau", "musica1_excerpt2")]
    );
}

#[test]
fn songs_are_ordered_naturally_and_positions_numerically() {
    let input = vec![
        excerpt("musica10", 1, "x"),
        excerpt("musica2", 10, "late"),
        excerpt("musica2", 2, "early"),
    ];
    let outcome = deduplicate(&input);
    let order: Vec<(&str, &str)> = outcome
        .excerpts
        .iter()
        .map(|e| (e.tag_trecho.as_str(), e.letra.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("musica2_excerpt1", "early"),
            ("musica2_excerpt2", "late"),
            ("musica10_excerpt1", "x"),
        ]
    );
}

#[test]
fn legacy_tags_are_understood() {
    let mut first = excerpt("musica1", 1, "oi");
    first.tag_trecho = "musica1_trecho2".into();
    let mut second = excerpt("musica1", 1, "tchau");
    second.tag_trecho = "musica1_trecho1".into();
    let outcome = deduplicate(&[first, second]);
    assert_eq!(
        texts_and_tags(&outcome.excerpts),
        vec![("tchau", "musica1_excerpt1"), ("oi", "musica1_excerpt2")]
    );
}

#[test]
fn summary_breaks_down_removals_per_song() {
    let input = vec![
        excerpt("musica1", 1, "a"),
        excerpt("musica1", 2, "a"),
        excerpt("musica2", 1, "b"),
        excerpt("musica2", 2, "b"),
        excerpt("musica2", 3, "b"),
        excerpt("musica3", 1, "c"),
    ];
    let summary = deduplicate(&input).summary;
    assert_eq!(summary.before, 6);
    assert_eq!(summary.after, 3);
    assert_eq!(summary.removed, 3);
    assert!((summary.removed_pct - 50.0).abs() < 1e-9);
    assert_eq!(summary.songs, 3);
    assert_eq!(summary.songs_with_duplicates, 2);
    let breakdown: Vec<(&str, usize, usize, usize)> = summary
        .per_song
        .iter()
        .map(|s| (s.tag_musica.as_str(), s.before, s.after, s.removed))
        .collect();
    assert_eq!(breakdown, vec![("musica2", 3, 1, 2), ("musica1", 2, 1, 1)]);
    assert_eq!(summary.per_song[0].titulo, "Título musica2");
}

#[test]
fn empty_input_gives_zeroed_summary() {
    let outcome = deduplicate(&[]);
    assert!(outcome.excerpts.is_empty());
    assert_eq!(outcome.summary.before, 0);
    assert_eq!(outcome.summary.after, 0);
    assert_eq!(outcome.summary.removed, 0);
    assert_eq!(outcome.summary.removed_pct, 0.0);
    assert!(outcome.summary.per_song.is_empty());
}

#[test]
fn metadata_survives_renumbering() {
    let input = vec![excerpt("musica4", 1, "x"), excerpt("musica4", 2, "x"), excerpt("musica4", 3, "y")];
    let outcome = deduplicate(&input);
    let kept = &outcome.excerpts[1];
    assert_eq!(kept.letra, "y");
    assert_eq!(kept.titulo, "Título musica4");
    assert_eq!(kept.ano, Some(2023));
    assert_eq!(kept.contagem_palavras, 1);
}

fn arb_excerpts() -> impl Strategy<Value = Vec<ExcerptRecord>> {
    proptest::collection::vec((1usize..5, "[a-c]{0,2}"), 0..40).prop_map(|rows| {
        let mut next_position = [0usize; 5];
        rows.into_iter()
            .map(|(song, text)| {
                next_position[song] += 1;
                excerpt(&format!("musica{song}"), next_position[song], &text)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn dedup_is_idempotent(input in arb_excerpts()) {
        let once = deduplicate(&input);
        let twice = deduplicate(&once.excerpts);
        prop_assert_eq!(twice.summary.removed, 0);
        prop_assert_eq!(&twice.excerpts, &once.excerpts);
    }

    #[test]
    fn counts_add_up(input in arb_excerpts()) {
        let summary = deduplicate(&input).summary;
        prop_assert_eq!(summary.before - summary.removed, summary.after);
        prop_assert_eq!(summary.before, input.len());
        let per_song: usize = summary.per_song.iter().map(|s| s.removed).sum();
        prop_assert_eq!(per_song, summary.removed);
    }

    #[test]
    fn positions_are_dense_and_texts_unique(input in arb_excerpts()) {
        let outcome = deduplicate(&input);
        let mut last: Option<(&str, usize)> = None;
        let mut seen = std::collections::HashSet::new();
        for e in &outcome.excerpts {
            let position = e.position().expect("numbered tag");
            match last {
                Some((song, prev)) if song == e.tag_musica => prop_assert_eq!(position, prev + 1),
                _ => prop_assert_eq!(position, 1),
            }
            prop_assert!(seen.insert((e.tag_musica.clone(), e.letra.clone())));
            last = Some((e.tag_musica.as_str(), position));
        }
    }
}
