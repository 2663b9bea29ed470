//! Lookup tables that give document types their domain, family and checklist.
//!
//! The tables are data, not logic: graph, query and validation code only ever
//! ask a [`Taxonomy`] instance. The built-in tables are the canonical BSpec 1.0
//! assignment; `[taxonomy]` in `config.toml` can replace any of them.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::config::TaxonomyConfig;
use crate::error::{BspecError, Result};
use crate::model::{BusinessDomain, Document, TypeCode};

/// Number of document types defined by BSpec 1.0
pub const DEFAULT_KNOWN_TYPE_COUNT: usize = 82;

/// Per-domain checklist of expected document types. A code listed under more
/// than one domain belongs to the first domain listed here.
const CANONICAL_DOMAIN_TYPES: &[(BusinessDomain, &[&str])] = &[
    (BusinessDomain::Strategic, &["MSN", "VSN", "VAL", "STR", "OBJ", "MOT", "PUR", "THY"]),
    (BusinessDomain::Market, &["MKT", "SEG", "CMP", "POS", "TRN", "ECO", "OPP", "THR", "REG", "MAC"]),
    (
        BusinessDomain::Customer,
        &["PER", "JTB", "CJM", "USE", "STO", "PAI", "GAI", "EMP", "FEE", "INT", "SUR", "BEH"],
    ),
    (BusinessDomain::Product, &["PRD", "SVC", "FEA", "ROD", "REQ", "QUA", "UXD", "PER", "INT", "SUP"]),
    (
        BusinessDomain::Model,
        &["BMC", "REV", "PRC", "CST", "CHN", "REL", "RES", "ACT", "PRT", "UNT", "LTV", "CAC"],
    ),
    (
        BusinessDomain::Operations,
        &["PRC", "WFL", "ORG", "ROL", "TEA", "SKI", "POL", "SLA", "VND", "FAC", "TOO", "CAP"],
    ),
    (BusinessDomain::Technology, &["ARC", "SYS", "DAT", "API", "INF", "SEC", "DEV", "ANA"]),
    (BusinessDomain::Financial, &["FIN", "BUD", "FOR", "FND", "INV", "VAL", "MET", "REP", "AUD", "TAX"]),
    (BusinessDomain::Risk, &["RSK", "MIT", "CMP", "GVN", "CTL", "CRI", "ETH", "STA"]),
    (BusinessDomain::Growth, &["GTM", "GRW", "SCL", "EXP", "INN", "RND", "ACQ"]),
    (BusinessDomain::Learning, &["DEC", "LRN", "RET", "HYP", "KNO", "WIS"]),
];

/// Checklist codes that are planning vocabulary rather than BSpec 1.0
/// document types
const NON_DOCUMENT_CODES: &[&str] = &["CAC", "CAP", "DEC", "HYP", "KNO", "LRN", "RET", "SYS", "TEA", "WIS"];

/// Types that make up the strategic foundation of a critical path
const FOUNDATION_TYPES: &[&str] = &["MSN", "VSN", "VAL", "STR"];

/// Injected type/domain vocabulary.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    type_domains: HashMap<TypeCode, BusinessDomain>,
    domain_types: BTreeMap<BusinessDomain, Vec<TypeCode>>,
    families: BTreeMap<String, Vec<TypeCode>>,
    /// Codes the parser accepts as a document `type`
    known_types: BTreeSet<TypeCode>,
    foundation_types: Vec<TypeCode>,
    known_type_count: usize,
    strategic_domain: BusinessDomain,
    fallback_domain: BusinessDomain,
}

impl Default for Taxonomy {
    fn default() -> Self {
        let mut type_domains = HashMap::new();
        let mut domain_types = BTreeMap::new();
        let mut families = BTreeMap::new();
        let mut known_types = BTreeSet::new();

        for (domain, codes) in CANONICAL_DOMAIN_TYPES {
            let codes: Vec<TypeCode> = codes.iter().map(|c| TypeCode::from(*c)).collect();
            for code in &codes {
                type_domains.entry(code.clone()).or_insert(*domain);
                if !NON_DOCUMENT_CODES.contains(&code.as_str()) {
                    known_types.insert(code.clone());
                }
            }
            families.insert(domain.as_str().to_string(), codes.clone());
            domain_types.insert(*domain, codes);
        }

        Self {
            type_domains,
            domain_types,
            families,
            known_types,
            foundation_types: FOUNDATION_TYPES.iter().map(|c| TypeCode::from(*c)).collect(),
            known_type_count: DEFAULT_KNOWN_TYPE_COUNT,
            strategic_domain: BusinessDomain::Strategic,
            fallback_domain: BusinessDomain::Strategic,
        }
    }
}

impl Taxonomy {
    /// Build a taxonomy from the `[taxonomy]` config section, starting from the
    /// canonical tables and replacing whichever tables the section provides.
    pub fn from_config(config: &TaxonomyConfig) -> Result<Self> {
        let mut taxonomy = Self::default();

        if let Some(domain_types) = &config.domain_types {
            let mut parsed = BTreeMap::new();
            for (domain, codes) in domain_types {
                let domain: BusinessDomain = domain.parse().map_err(|_| {
                    BspecError::Config(format!("taxonomy.domain_types: unknown domain '{}'", domain))
                })?;
                parsed.insert(domain, dedup_codes(codes));
            }
            taxonomy.domain_types = parsed;
        }

        if let Some(type_domains) = &config.type_domains {
            let mut parsed = HashMap::new();
            for (code, domain) in type_domains {
                let domain: BusinessDomain = domain.parse().map_err(|_| {
                    BspecError::Config(format!(
                        "taxonomy.type_domains: unknown domain '{}' for type {}",
                        domain, code
                    ))
                })?;
                parsed.insert(TypeCode::new(code.clone()), domain);
            }
            taxonomy.type_domains = parsed;
        }

        if let Some(families) = &config.families {
            taxonomy.families = families
                .iter()
                .map(|(family, codes)| (family.clone(), dedup_codes(codes)))
                .collect();
        }

        if let Some(codes) = &config.known_types {
            taxonomy.known_types = codes.iter().map(|code| TypeCode::new(code.clone())).collect();
        }

        if let Some(codes) = &config.foundation_types {
            taxonomy.foundation_types = dedup_codes(codes);
        }

        if let Some(count) = config.known_type_count {
            if count == 0 {
                return Err(BspecError::Config(
                    "taxonomy.known_type_count must be greater than 0".to_string(),
                ));
            }
            taxonomy.known_type_count = count;
        }

        if let Some(domain) = &config.strategic_domain {
            taxonomy.strategic_domain = domain.parse().map_err(|_| {
                BspecError::Config(format!("taxonomy.strategic_domain: unknown domain '{}'", domain))
            })?;
        }

        if let Some(domain) = &config.fallback_domain {
            taxonomy.fallback_domain = domain.parse().map_err(|_| {
                BspecError::Config(format!("taxonomy.fallback_domain: unknown domain '{}'", domain))
            })?;
        }

        Ok(taxonomy)
    }

    /// Default domain of a type code, if the taxonomy maps it.
    pub fn domain_for_type(&self, code: &TypeCode) -> Option<BusinessDomain> {
        self.type_domains.get(code).copied()
    }

    /// Explicit `domain`, else the type's default domain, else the fallback.
    pub fn resolve_domain(&self, doc: &Document) -> BusinessDomain {
        doc.domain
            .or_else(|| self.domain_for_type(&doc.doc_type))
            .unwrap_or(self.fallback_domain)
    }

    /// Checklist of types expected in a domain; empty for unlisted domains.
    pub fn expected_types(&self, domain: BusinessDomain) -> &[TypeCode] {
        self.domain_types
            .get(&domain)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Coarse type grouping used by similarity scoring.
    pub fn family_of(&self, code: &TypeCode) -> Option<&str> {
        self.families
            .iter()
            .find(|(_, codes)| codes.contains(code))
            .map(|(family, _)| family.as_str())
    }

    pub fn is_known_type(&self, code: &TypeCode) -> bool {
        self.known_types.contains(code)
    }

    /// Document type codes, sorted.
    pub fn known_types(&self) -> Vec<TypeCode> {
        self.known_types.iter().cloned().collect()
    }

    /// Domains that have a checklist.
    pub fn domains(&self) -> impl Iterator<Item = BusinessDomain> + '_ {
        self.domain_types.keys().copied()
    }

    /// Denominator of the collection completeness score.
    pub fn known_type_count(&self) -> usize {
        self.known_type_count
    }

    /// Domain whose clusters are always rated high criticality.
    pub fn strategic_domain(&self) -> BusinessDomain {
        self.strategic_domain
    }

    pub fn is_foundation_type(&self, code: &TypeCode) -> bool {
        self.foundation_types.contains(code)
    }
}

fn dedup_codes(codes: &[String]) -> Vec<TypeCode> {
    let mut seen = BTreeSet::new();
    codes
        .iter()
        .filter(|code| seen.insert(code.as_str()))
        .map(|code| TypeCode::new(code.clone()))
        .collect()
}
