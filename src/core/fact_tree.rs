//! # FactTree — Árvore Hierárquica de Fatos
//!
//! A [`FactTree`] guarda tudo o que o motor sabe observar. Cada nó é um
//! [`FactNode`] explícito:
//!
//! | Variante | JSON | Significado |
//! |----------|------|-------------|
//! | `Branch` | objeto | agrupamento (ex: `skin`) |
//! | `Leaf` | array de strings | fato observável + regras que ele sustenta |
//! | `Value` | bool/número/string | valor escalar do armazenamento legado |
//!
//! ```text
//! /
//! ├── skin
//! │   ├── red     → ["flu"]
//! │   └── purple  → ["bruise"]
//! └── fever       → ["flu"]
//! ```
//!
//! O endereço de uma folha é um [`FactPath`], serializado como `/skin/red`.
//! A árvore usa `BTreeMap` para que a busca em profundidade seja
//! determinística.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::rules::RuleId;
use crate::error::{EngineError, EngineResult};

/// Separador de segmentos de um [`FactPath`].
pub const PATH_SEPARATOR: char = '/';

/// Endereço único de uma folha na árvore, da raiz até o nó.
///
/// Os segmentos nunca são vazios e nunca contêm [`PATH_SEPARATOR`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactPath(Vec<String>);

impl FactPath {
    /// Interpreta um caminho como `/skin/red` (a barra inicial é opcional).
    ///
    /// # Erros
    ///
    /// [`EngineError::InvalidPath`] se o caminho estiver vazio ou tiver
    /// algum segmento vazio (`/skin//red`).
    pub fn parse(raw: &str) -> EngineResult<Self> {
        let trimmed = raw.trim();
        let body = trimmed.strip_prefix(PATH_SEPARATOR).unwrap_or(trimmed);
        if body.is_empty() {
            return Err(EngineError::InvalidPath(raw.to_string()));
        }
        let segments: Vec<String> = body.split(PATH_SEPARATOR).map(str::to_string).collect();
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(EngineError::InvalidPath(raw.to_string()));
        }
        Ok(Self(segments))
    }

    /// Novo caminho com `segment` acrescentado ao final.
    ///
    /// `segment` vem de uma chave da própria árvore, que já respeita
    /// o invariante.
    pub(crate) fn child(&self, segment: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    /// Segmentos vindos das chaves da própria árvore.
    pub(crate) fn from_trusted(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// `true` se `prefix` for este caminho ou um ancestral dele.
    pub fn starts_with(&self, prefix: &FactPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// `true` se algum segmento for igual a `token` (sem diferenciar caixa).
    pub fn contains_segment(&self, token: &str) -> bool {
        self.0.iter().any(|s| s.to_lowercase() == token)
    }
}

impl fmt::Display for FactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "{}{}", PATH_SEPARATOR, segment)?;
        }
        Ok(())
    }
}

impl Serialize for FactPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FactPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        FactPath::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Valor escalar do armazenamento legado (`tell`/`ask_fact`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Interpreta texto livre: `true`/`false`, inteiro, decimal, ou texto.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw {
            "true" => Scalar::Bool(true),
            "false" => Scalar::Bool(false),
            _ => {
                if let Ok(i) = raw.parse::<i64>() {
                    Scalar::Integer(i)
                } else if let Ok(f) = raw.parse::<f64>() {
                    Scalar::Float(f)
                } else {
                    Scalar::Text(raw.to_string())
                }
            }
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Integer(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Nó da árvore de fatos.
///
/// A ordem das variantes importa para o `serde(untagged)`: arrays viram
/// `Leaf`, objetos viram `Branch`, o resto vira `Value`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactNode {
    /// Fato observável; lista as regras para as quais ele é evidência.
    Leaf(Vec<RuleId>),
    /// Agrupamento de fatos (ex: parte do corpo).
    Branch(BTreeMap<String, FactNode>),
    /// Escalar gravado via `tell`.
    Value(Scalar),
}

impl FactNode {
    /// `true` se for um `Branch` cujos filhos diretos incluem alguma folha.
    pub fn has_leaf_children(&self) -> bool {
        match self {
            FactNode::Branch(children) => children.values().any(|c| matches!(c, FactNode::Leaf(_))),
            FactNode::Leaf(_) | FactNode::Value(_) => false,
        }
    }
}

/// Árvore de fatos completa (a raiz é sempre um mapa).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactTree {
    root: BTreeMap<String, FactNode>,
}

impl FactTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filhos da raiz.
    pub fn roots(&self) -> &BTreeMap<String, FactNode> {
        &self.root
    }

    /// Busca o nó endereçado por `path`.
    pub fn get(&self, path: &FactPath) -> Option<&FactNode> {
        let (first, rest) = path.segments().split_first()?;
        let mut node = self.root.get(first)?;
        for segment in rest {
            node = match node {
                FactNode::Branch(children) => children.get(segment)?,
                FactNode::Leaf(_) | FactNode::Value(_) => return None,
            };
        }
        Some(node)
    }

    /// Lista de regras da folha em `path`, se `path` for uma folha.
    pub fn leaf_rules(&self, path: &FactPath) -> Option<&[RuleId]> {
        match self.get(path)? {
            FactNode::Leaf(rules) => Some(rules.as_slice()),
            FactNode::Branch(_) | FactNode::Value(_) => None,
        }
    }

    /// Acrescenta `rule` à folha em `path`, sem duplicar.
    ///
    /// Cria os `Branch` intermediários e a folha se não existirem. Nunca
    /// sobrescreve nós existentes: um `Leaf`/`Value` no meio do caminho,
    /// ou um `Branch`/`Value` no destino, é rejeitado. Só nós já existentes
    /// podem causar o erro, então a árvore fica intacta quando ele ocorre.
    ///
    /// Retorna `Ok(true)` se a lista da folha mudou.
    ///
    /// # Erros
    ///
    /// [`EngineError::InvalidPath`] se `path` não puder ser uma folha.
    pub fn append_rule(&mut self, path: &FactPath, rule: &str) -> EngineResult<bool> {
        let invalid = || EngineError::InvalidPath(path.to_string());
        let (last, parents) = path.segments().split_last().ok_or_else(invalid)?;

        let mut children = &mut self.root;
        for segment in parents {
            let entry = children
                .entry(segment.clone())
                .or_insert_with(|| FactNode::Branch(BTreeMap::new()));
            children = match entry {
                FactNode::Branch(map) => map,
                FactNode::Leaf(_) | FactNode::Value(_) => return Err(invalid()),
            };
        }
        match children
            .entry(last.clone())
            .or_insert_with(|| FactNode::Leaf(Vec::new()))
        {
            FactNode::Leaf(rules) if rules.iter().any(|r| r == rule) => Ok(false),
            FactNode::Leaf(rules) => {
                rules.push(rule.to_string());
                Ok(true)
            }
            FactNode::Branch(_) | FactNode::Value(_) => Err(invalid()),
        }
    }

    /// Grava (mesclando) um escalar em `path` — o `tell` legado.
    pub fn set_value(&mut self, path: &FactPath, value: Scalar) {
        if let Some(node) = self.node_mut_or_insert(path, || FactNode::Value(Scalar::Bool(false))) {
            *node = FactNode::Value(value);
        }
    }

    /// Lê o escalar em `path` — o `ask` legado.
    ///
    /// # Erros
    ///
    /// [`EngineError::AmbiguousValue`] se o caminho apontar para uma
    /// sub-árvore ou lista de regras, e não para um valor único.
    pub fn value(&self, path: &FactPath) -> EngineResult<Option<&Scalar>> {
        match self.get(path) {
            None => Ok(None),
            Some(FactNode::Value(v)) => Ok(Some(v)),
            Some(FactNode::Branch(_)) | Some(FactNode::Leaf(_)) => {
                Err(EngineError::AmbiguousValue(path.to_string()))
            }
        }
    }

    /// Caminho até o nó em `path`, criando `Branch`es intermediários.
    fn node_mut_or_insert(
        &mut self,
        path: &FactPath,
        default: impl FnOnce() -> FactNode,
    ) -> Option<&mut FactNode> {
        let (last, parents) = path.segments().split_last()?;

        let mut children = &mut self.root;
        for segment in parents {
            let entry = children
                .entry(segment.clone())
                .or_insert_with(|| FactNode::Branch(BTreeMap::new()));
            if !matches!(entry, FactNode::Branch(_)) {
                *entry = FactNode::Branch(BTreeMap::new());
            }
            children = match entry {
                FactNode::Branch(map) => map,
                FactNode::Leaf(_) | FactNode::Value(_) => unreachable!("convertido em Branch acima"),
            };
        }
        Some(children.entry(last.clone()).or_insert_with(default))
    }

    /// Número de folhas (fatos observáveis) na árvore.
    pub fn leaf_count(&self) -> usize {
        fn count(children: &BTreeMap<String, FactNode>) -> usize {
            children
                .values()
                .map(|node| match node {
                    FactNode::Leaf(_) => 1,
                    FactNode::Branch(inner) => count(inner),
                    FactNode::Value(_) => 0,
                })
                .sum()
        }
        count(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(raw: &str) -> FactPath {
        FactPath::parse(raw).unwrap()
    }

    #[test]
    fn parse_and_display_roundtrip() {
        let p = path("/skin/red");
        assert_eq!(p.segments(), &["skin".to_string(), "red".to_string()]);
        assert_eq!(p.to_string(), "/skin/red");
        assert_eq!(path("skin/red"), p);
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert!(FactPath::parse("").is_err());
        assert!(FactPath::parse("/").is_err());
        assert!(FactPath::parse("/skin//red").is_err());
    }

    #[test]
    fn deserializes_tagged_shapes_from_json() {
        let tree: FactTree = serde_json::from_str(
            r#"{"skin": {"red": ["flu"], "purple": ["bruise"]}, "fever": ["flu"], "age": 42}"#,
        )
        .unwrap();
        assert_eq!(tree.leaf_rules(&path("/skin/red")), Some(&["flu".to_string()][..]));
        assert_eq!(tree.leaf_rules(&path("/fever")), Some(&["flu".to_string()][..]));
        assert!(matches!(tree.get(&path("/skin")), Some(FactNode::Branch(_))));
        assert_eq!(tree.value(&path("/age")).unwrap(), Some(&Scalar::Integer(42)));
        assert_eq!(tree.leaf_count(), 3);
    }

    #[test]
    fn scalar_roundtrip() {
        let mut tree = FactTree::new();
        tree.set_value(&path("/a/b"), Scalar::from(5));
        assert_eq!(tree.value(&path("/a/b")).unwrap(), Some(&Scalar::Integer(5)));
    }

    #[test]
    fn set_value_merges_with_siblings() {
        let mut tree = FactTree::new();
        tree.set_value(&path("/patient/name"), Scalar::from("ana"));
        tree.set_value(&path("/patient/age"), Scalar::from(30));
        assert_eq!(tree.value(&path("/patient/name")).unwrap(), Some(&Scalar::from("ana")));
        assert_eq!(tree.value(&path("/patient/age")).unwrap(), Some(&Scalar::Integer(30)));
    }

    #[test]
    fn reading_a_subtree_is_ambiguous() {
        let mut tree = FactTree::new();
        tree.set_value(&path("/a/b"), Scalar::from(true));
        assert!(matches!(
            tree.value(&path("/a")),
            Err(EngineError::AmbiguousValue(_))
        ));
        tree.append_rule(&path("/skin/red"), "flu").unwrap();
        assert!(matches!(
            tree.value(&path("/skin/red")),
            Err(EngineError::AmbiguousValue(_))
        ));
        assert_eq!(tree.value(&path("/missing")).unwrap(), None);
    }

    #[test]
    fn append_rule_never_duplicates() {
        let mut tree = FactTree::new();
        assert!(tree.append_rule(&path("/skin/red"), "flu").unwrap());
        assert!(!tree.append_rule(&path("/skin/red"), "flu").unwrap());
        assert!(tree.append_rule(&path("/skin/red"), "measles").unwrap());
        assert_eq!(tree.leaf_rules(&path("/skin/red")).unwrap().len(), 2);
    }

    #[test]
    fn append_rule_never_overwrites_existing_nodes() {
        let mut tree: FactTree = serde_json::from_str(
            r#"{"skin": {"red": ["flu"], "purple": ["bruise"]}, "fever": ["flu"], "age": 42}"#,
        )
        .unwrap();
        let before = tree.clone();

        for target in ["/skin", "/fever/high", "/age", "/age/months"] {
            assert!(
                matches!(
                    tree.append_rule(&path(target), "rash"),
                    Err(EngineError::InvalidPath(p)) if p == target
                ),
                "{target} deveria ser rejeitado"
            );
        }
        assert_eq!(tree, before);

        assert!(tree.append_rule(&path("/skin/blue"), "rash").unwrap());
        assert!(tree.append_rule(&path("/eyes/dry"), "rash").unwrap());
        assert_eq!(tree.leaf_rules(&path("/skin/red")), Some(&["flu".to_string()][..]));
        assert_eq!(tree.leaf_count(), 5);
    }

    #[test]
    fn scalar_parse() {
        assert_eq!(Scalar::parse("true"), Scalar::Bool(true));
        assert_eq!(Scalar::parse("5"), Scalar::Integer(5));
        assert_eq!(Scalar::parse("37.5"), Scalar::Float(37.5));
        assert_eq!(Scalar::parse("high"), Scalar::Text("high".into()));
    }
}
