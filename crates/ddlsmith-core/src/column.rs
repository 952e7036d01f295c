use tracing::{debug, warn};

use crate::attributes::Attributes;
use crate::dictionary::Dictionary;
use crate::document::{Node, integer, is_truthy};
use crate::domain::Domains;
use crate::error::Result;
use crate::placeholder::expand_column_check;
use crate::reference::Reference;

const INDEX_KEY_PREFIX: &str = "index";

/// Membership of a column in a named index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMembership {
    /// Index key as authored, e.g. `index2`.
    pub key: String,
    /// Position of the column inside the index; lower comes first.
    pub rank: i64,
}

/// Returns the numeric suffix of an `index<digits>` key.
pub fn index_number(key: &str) -> &str {
    let digits = key
        .bytes()
        .rev()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    &key[key.len() - digits..]
}

fn is_index_key(key: &str) -> bool {
    key.strip_prefix(INDEX_KEY_PREFIX)
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// One column after domain merging and name translation.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    logical_name: Option<String>,
    physical_name: Option<String>,
    domain: Option<String>,
    applied_domain: Option<String>,
    data_type: Option<String>,
    size: Option<String>,
    default: Option<String>,
    nullable: bool,
    comment: String,
    primary_key_rank: Option<i64>,
    indexes: Vec<IndexMembership>,
    checks: Vec<String>,
    references: Vec<Reference>,
}

impl Column {
    /// Build a column from its raw mapping.
    ///
    /// A declared `domain` is layered underneath the raw attributes. Without a
    /// declared domain that resolves, and only when no `type` is given, the
    /// domain named like the column is used instead.
    pub fn from_node(
        node: &Node<'_>,
        dictionary: Option<&Dictionary>,
        domains: Option<&Domains>,
    ) -> Result<Self> {
        let raw = Attributes::from_node(node)?;
        let logical_name = raw.text("name");
        let domain = raw.text("domain");

        let (attributes, applied_domain) = match domains {
            Some(domains) => merge_domain(&raw, domain.as_deref(), logical_name.as_deref(), domains),
            None => (raw, None),
        };

        let physical_name = attributes.text("pname").or_else(|| {
            let logical = logical_name.as_deref()?;
            Some(match dictionary {
                Some(dictionary) => dictionary.translate(logical),
                None => logical.to_string(),
            })
        });

        let nullable = if attributes.contains("nullable") {
            attributes.get("nullable").is_some_and(is_truthy)
        } else {
            true
        };

        let primary_key_rank = attributes
            .get("pkey")
            .filter(|value| is_truthy(value))
            .map(|value| rank_or_zero(value, "pkey", node.path()));

        let mut indexes: Vec<IndexMembership> = attributes
            .keys()
            .filter(|(key, value)| is_index_key(key) && is_truthy(value))
            .map(|(key, value)| IndexMembership {
                key: key.to_string(),
                rank: rank_or_zero(value, key, node.path()),
            })
            .collect();
        indexes.sort_by(|left, right| left.key.cmp(&right.key));

        let local = physical_name.clone().unwrap_or_default();

        let checks: Vec<String> = attributes
            .node("check", node.path())
            .map(|checks| {
                checks
                    .items()
                    .iter()
                    .map(|item| Ok(expand_column_check(&item.text()?, &local)))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        let references = match attributes.node("refers", node.path()) {
            Some(refers) => refers
                .items()
                .iter()
                .map(|item| Reference::from_node(item, &local))
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            logical_name,
            physical_name,
            domain,
            applied_domain,
            data_type: attributes.text("type"),
            size: attributes.text("size"),
            default: attributes.text("default"),
            nullable,
            comment: attributes.text("comment").unwrap_or_default(),
            primary_key_rank,
            indexes,
            checks,
            references,
        })
    }

    /// Logical name as authored, dots included.
    pub fn logical_name(&self) -> Option<&str> {
        self.logical_name.as_deref()
    }

    /// Logical name with the segment dots removed, as shown in comments.
    pub fn display_name(&self) -> String {
        self.logical_name
            .as_deref()
            .map(|name| name.replace('.', ""))
            .unwrap_or_default()
    }

    pub fn physical_name(&self) -> Option<&str> {
        self.physical_name.as_deref()
    }

    /// Domain named by the column, whether or not it resolved.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Domain whose template was merged into this column.
    pub fn applied_domain(&self) -> Option<&str> {
        self.applied_domain.as_deref()
    }

    pub fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref()
    }

    pub fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn primary_key_rank(&self) -> Option<i64> {
        self.primary_key_rank
    }

    /// Index memberships sorted by key.
    pub fn indexes(&self) -> &[IndexMembership] {
        &self.indexes
    }

    /// Rank of this column inside the index `key`, if it belongs to it.
    pub fn index_rank(&self, key: &str) -> Option<i64> {
        self.indexes
            .iter()
            .find(|membership| membership.key == key)
            .map(|membership| membership.rank)
    }

    /// Check expressions with the column placeholder already expanded.
    pub fn checks(&self) -> &[String] {
        &self.checks
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }
}

fn merge_domain(
    raw: &Attributes,
    domain: Option<&str>,
    logical_name: Option<&str>,
    domains: &Domains,
) -> (Attributes, Option<String>) {
    if let Some((name, template)) =
        domain.and_then(|name| domains.resolve(name).map(|template| (name, template)))
    {
        debug!(domain = name, "merging declared domain");
        return (Attributes::layered(template, raw), Some(name.to_string()));
    }

    if raw.get("type").is_none() {
        let implicit = logical_name.map(|name| name.replace('.', ""));
        if let Some((name, template)) = implicit
            .as_deref()
            .and_then(|name| domains.resolve(name).map(|template| (name, template)))
        {
            debug!(domain = name, "merging domain named after column");
            return (Attributes::layered(template, raw), Some(name.to_string()));
        }
    }

    (raw.clone(), None)
}

fn rank_or_zero(value: &serde_yaml::Value, key: &str, path: &str) -> i64 {
    integer(value).unwrap_or_else(|| {
        warn!(path, key, "rank is not an integer, using 0");
        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::reference::TableTarget;

    fn domains() -> Domains {
        let document = Document::parse(
            "domains: {domain1: {type: number, size: 10, default: 200, nullable: false}}",
        )
        .unwrap();
        Domains::from_document(&document).unwrap()
    }

    fn dictionary() -> Dictionary {
        Dictionary::from_entries([("word1", "AAA"), ("word2", "BBB"), ("word3", "CCC")])
    }

    fn column(yaml: &str, dictionary: Option<&Dictionary>, domains: Option<&Domains>) -> Column {
        let document = Document::parse(yaml).unwrap();
        Column::from_node(&document.root(), dictionary, domains).unwrap()
    }

    #[test]
    fn empty_column_uses_defaults() {
        let column = column("error: error", None, None);
        assert!(column.physical_name().is_none());
        assert!(column.size().is_none());
        assert!(column.default().is_none());
        assert!(column.nullable());
        assert_eq!(column.comment(), "");
        assert!(column.checks().is_empty());
        assert!(column.references().is_empty());
    }

    #[test]
    fn declared_domain_fills_missing_attributes() {
        let domains = domains();
        let column = column("{pname: TEST1, domain: domain1}", None, Some(&domains));
        assert_eq!(column.data_type(), Some("number"));
        assert_eq!(column.size(), Some("10"));
        assert_eq!(column.default(), Some("200"));
        assert!(!column.nullable());
        assert_eq!(column.applied_domain(), Some("domain1"));
    }

    #[test]
    fn explicit_attributes_override_domain() {
        let domains = domains();
        let column = column(
            "{pname: TEST1, domain: domain1, size: 4, nullable: true}",
            None,
            Some(&domains),
        );
        assert_eq!(column.size(), Some("4"));
        assert!(column.nullable());
    }

    #[test]
    fn domain_named_after_column_applies_without_type() {
        let domains = domains();
        let implicit = column("{pname: TEST1, name: domain1}", None, Some(&domains));
        assert_eq!(implicit.data_type(), Some("number"));

        let typed = column("{pname: TEST1, name: domain1, type: date}", None, Some(&domains));
        assert_eq!(typed.data_type(), Some("date"));
        assert!(typed.applied_domain().is_none());
    }

    #[test]
    fn non_scalar_check_is_a_shape_error() {
        let document = Document::parse("{pname: P, check: ['>= 0', [nested]]}").unwrap();
        assert!(matches!(
            Column::from_node(&document.root(), None, None),
            Err(crate::error::Error::Shape { expected: "a scalar", .. })
        ));
    }

    #[test]
    fn null_type_still_looks_up_domain_by_name() {
        let domains = domains();
        let column = column("{pname: P, name: domain1, type: ~}", None, Some(&domains));
        assert_eq!(column.data_type(), Some("number"));
        assert_eq!(column.size(), Some("10"));
        assert_eq!(column.applied_domain(), Some("domain1"));
    }

    #[test]
    fn unresolved_declared_domain_falls_back_to_name() {
        let domains = domains();
        let column = column("{name: domain1, domain: nope}", None, Some(&domains));
        assert_eq!(column.domain(), Some("nope"));
        assert_eq!(column.applied_domain(), Some("domain1"));
    }

    #[test]
    fn physical_name_comes_from_dictionary() {
        let dictionary = dictionary();
        assert_eq!(
            column("{name: word1, type: number}", Some(&dictionary), None).physical_name(),
            Some("AAA")
        );
        assert_eq!(
            column("{name: word1.word2, type: number}", Some(&dictionary), None).physical_name(),
            Some("AAABBB")
        );
        assert_eq!(
            column("{pname: word1.word2, type: number}", Some(&dictionary), None).physical_name(),
            Some("word1.word2")
        );
        assert_eq!(
            column("{name: word1.word2}", None, None).physical_name(),
            Some("word1.word2")
        );
    }

    #[test]
    fn display_name_drops_dots() {
        let column = column("{name: word1.word2}", None, None);
        assert_eq!(column.display_name(), "word1word2");
        assert_eq!(column.logical_name(), Some("word1.word2"));
    }

    #[test]
    fn collects_index_memberships() {
        let column = column(
            "{name: word1, type: number, index2: 2, index1: 1, indexed: 3, index: 4}",
            None,
            None,
        );
        let keys: Vec<&str> = column.indexes().iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec!["index1", "index2"]);
        assert_eq!(column.index_rank("index2"), Some(2));
        assert_eq!(column.index_rank("index1"), Some(1));
        assert_eq!(column.index_rank("index3"), None);
    }

    #[test]
    fn expands_checks() {
        let column = column(
            "{pname: TEST1, check: ['>= 100', 'nvl(<name>, 0) <= 1000']}",
            None,
            None,
        );
        assert_eq!(
            column.checks(),
            &["TEST1 >= 100".to_string(), "nvl(TEST1, 0) <= 1000".to_string()]
        );

        let single = Column::from_node(
            &Document::parse("{pname: P, check: '<name> >= 100'}").unwrap().root(),
            None,
            None,
        )
        .unwrap();
        assert_eq!(single.checks(), &["P >= 100".to_string()]);
    }

    #[test]
    fn reads_references() {
        let first = column("{pname: TEST1, refers: {table: 1, order: 2, column: TEST2}}", None, None);
        let reference = &first.references()[0];
        assert_eq!(reference.target(), Some(&TableTarget::Position(1)));
        assert_eq!(reference.order(), 2);
        assert_eq!(reference.remote_column(), "TEST2");
        assert_eq!(reference.local_column(), "TEST1");

        let second = column("{pname: TEST3, refers: [{table: 0}, {table: 1}]}", None, None);
        assert_eq!(second.references().len(), 2);
        assert_eq!(second.references()[0].target(), Some(&TableTarget::Position(0)));
        assert_eq!(second.references()[0].order(), 0);
        assert_eq!(second.references()[0].remote_column(), "TEST3");
        assert_eq!(second.references()[1].remote_column(), "TEST3");
    }

    #[test]
    fn primary_key_rank_is_optional() {
        assert_eq!(column("{pname: A, pkey: 2}", None, None).primary_key_rank(), Some(2));
        assert_eq!(column("{pname: A}", None, None).primary_key_rank(), None);
    }

    #[test]
    fn index_number_takes_trailing_digits() {
        assert_eq!(index_number("index12"), "12");
        assert_eq!(index_number("index"), "");
    }
}
