//! # FactMatcher — De Termo Composto a Caminhos de Fato
//!
//! Resolve uma descrição curta do usuário ("skin red") em zero ou mais
//! [`FactPath`]s da [`FactTree`].
//!
//! ## Algoritmo
//!
//! ```text
//! tokens = "skin red".split_whitespace()       → [skin, red]
//! primário = último token                      → red
//! busca em profundidade por "red"              → [/skin/red, /eyes/red]
//!   (vazio? descarta o primário e tenta o token à esquerda)
//! filtro: cada match precisa conter TODOS os tokens restantes
//!   /eyes/red não contém "skin"                → rejeitado
//! resultado = matches − rejeitados             → [/skin/red]
//! ```
//!
//! Um `Branch` cujo nome casa com o token contribui com as suas folhas
//! diretas: `"skin"` sozinho resolve para `/skin/red` **e** `/skin/purple`.
//!
//! Valores escalares (`tell`) nunca são resultados de busca.

use std::collections::HashSet;
use std::hash::Hash;

use crate::core::{FactNode, FactPath, FactTree};

/// Resolve termos compostos contra uma árvore de fatos.
///
/// Não guarda estado além da referência à árvore; a resolução é uma
/// função pura do snapshot recebido.
pub struct FactMatcher<'a> {
    tree: &'a FactTree,
}

impl<'a> FactMatcher<'a> {
    pub fn new(tree: &'a FactTree) -> Self {
        Self { tree }
    }

    /// Caminhos de fato descritos por `compound_term`.
    ///
    /// Retorna vazio quando o termo não pôde ser resolvido; o chamador
    /// decide o fallback (sinônimos, pergunta ao usuário).
    pub fn resolve_term(&self, compound_term: &str) -> Vec<FactPath> {
        let mut tokens: Vec<String> = compound_term
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        while let Some(primary) = tokens.pop() {
            let matches = self.search(&primary);
            if matches.is_empty() {
                continue;
            }
            if tokens.is_empty() {
                return difference(&matches, &[]);
            }

            let rejected: Vec<FactPath> = matches
                .iter()
                .filter(|path| !tokens.iter().all(|t| path.contains_segment(t)))
                .cloned()
                .collect();
            let resolved = difference(&matches, &rejected);
            tracing::debug!(
                term = %compound_term,
                primary = %primary,
                matched = matches.len(),
                rejected = rejected.len(),
                "Termo filtrado pelos tokens restantes"
            );
            return resolved;
        }

        Vec::new()
    }

    /// Todas as folhas endereçadas por um único `token`, em ordem de
    /// busca em profundidade.
    pub fn search(&self, token: &str) -> Vec<FactPath> {
        let token = token.to_lowercase();
        let mut found = Vec::new();
        for (name, node) in self.tree.roots() {
            visit(
                FactPath::from_trusted(vec![name.clone()]),
                name,
                node,
                &token,
                &mut found,
            );
        }
        found
    }
}

fn visit(path: FactPath, name: &str, node: &FactNode, token: &str, found: &mut Vec<FactPath>) {
    let hit = name.to_lowercase() == token;
    match node {
        FactNode::Leaf(_) => {
            if hit {
                found.push(path);
            }
        }
        FactNode::Branch(children) => {
            // Agrupamento de dois níveis: o nome do pai endereça as folhas filhas.
            if hit && node.has_leaf_children() {
                for (child_name, child) in children {
                    if matches!(child, FactNode::Leaf(_)) {
                        found.push(path.child(child_name));
                    }
                }
            }
            for (child_name, child) in children {
                visit(path.child(child_name), child_name, child, token, found);
            }
        }
        FactNode::Value(_) => {}
    }
}

/// Diferença de conjuntos `a − b`, preservando a ordem de `a`.
///
/// Duplicatas colapsam: `difference(&[x, x], &[])` é `[x]`.
pub fn difference<T: Clone + Eq + Hash>(a: &[T], b: &[T]) -> Vec<T> {
    let rejected: HashSet<&T> = b.iter().collect();
    let mut seen: HashSet<&T> = HashSet::new();
    a.iter()
        .filter(|item| !rejected.contains(item) && seen.insert(*item))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> FactTree {
        serde_json::from_str(
            r#"{
                "skin": {"red": ["flu"], "purple": ["bruise"]},
                "eyes": {"red": ["conjunctivitis"]},
                "fever": ["flu"],
                "shakings": ["hypothermia"],
                "patient": {"age": 42}
            }"#,
        )
        .unwrap()
    }

    fn paths(raw: &[&str]) -> Vec<FactPath> {
        raw.iter().map(|p| FactPath::parse(p).unwrap()).collect()
    }

    #[test]
    fn two_word_term_narrows_to_single_leaf() {
        let tree = tree();
        let matcher = FactMatcher::new(&tree);
        assert_eq!(matcher.resolve_term("skin red"), paths(&["/skin/red"]));
        assert_eq!(matcher.resolve_term("eyes red"), paths(&["/eyes/red"]));
    }

    #[test]
    fn parent_name_alone_keeps_every_child_leaf() {
        let tree = tree();
        let matcher = FactMatcher::new(&tree);
        assert_eq!(
            matcher.resolve_term("skin"),
            paths(&["/skin/purple", "/skin/red"])
        );
    }

    #[test]
    fn ambiguous_single_word_keeps_all_matches() {
        let tree = tree();
        let matcher = FactMatcher::new(&tree);
        assert_eq!(matcher.resolve_term("red"), paths(&["/eyes/red", "/skin/red"]));
    }

    #[test]
    fn falls_back_to_tokens_on_the_left() {
        let tree = tree();
        let matcher = FactMatcher::new(&tree);
        // "mild" não existe; "fever" à esquerda é usado.
        assert_eq!(matcher.resolve_term("fever mild"), paths(&["/fever"]));
    }

    #[test]
    fn filter_can_leave_term_unresolved() {
        let tree = tree();
        let matcher = FactMatcher::new(&tree);
        assert!(matcher.resolve_term("cold skin").is_empty());
        assert!(matcher.resolve_term("nothing here").is_empty());
        assert!(matcher.resolve_term("").is_empty());
    }

    #[test]
    fn matching_ignores_case_and_scalars() {
        let tree = tree();
        let matcher = FactMatcher::new(&tree);
        assert_eq!(matcher.resolve_term("Skin RED"), paths(&["/skin/red"]));
        assert!(matcher.resolve_term("age").is_empty());
    }

    #[test]
    fn every_leaf_name_resolves_to_a_path_ending_in_it() {
        let tree = tree();
        let matcher = FactMatcher::new(&tree);
        for leaf in ["red", "purple", "fever", "shakings"] {
            let resolved = matcher.resolve_term(leaf);
            assert!(!resolved.is_empty(), "{leaf} não resolveu");
            assert!(
                resolved.iter().any(|p| p.segments().last().map(String::as_str) == Some(leaf)),
                "{leaf} → {resolved:?}"
            );
        }
    }

    #[test]
    fn difference_laws() {
        let a = vec![1, 2, 2, 3];
        assert!(difference(&a, &a).is_empty());
        assert_eq!(difference(&a, &[]), vec![1, 2, 3]);
        assert_eq!(difference(&a, &[2]), vec![1, 3]);
        assert_eq!(difference(&[3, 1, 3], &[1]), vec![3]);
    }
}
