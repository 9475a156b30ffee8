//! The account descriptor returned by Teller's `GET /accounts`.
//!
//! See https://teller.io/docs/api/accounts

use serde::{Deserialize, Serialize};

/// Upstream classification of an account's family.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Depository,
    Credit,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Upstream classification of an account within its family.
///
/// Depository accounts are one of `checking`, `savings`, `money_market`,
/// `certificate_of_deposit`, `treasury` or `sweep`. Credit accounts are `credit_card`.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountSubtype {
    Checking,
    Savings,
    MoneyMarket,
    CertificateOfDeposit,
    Treasury,
    Sweep,
    CreditCard,
    #[default]
    #[serde(other)]
    Unknown,
}

serde_plain::derive_display_from_serialize!(AccountSubtype);

impl AccountSubtype {
    /// The subtypes we budget against: day-to-day spending happens in checking and on credit cards.
    pub const RELEVANT: [AccountSubtype; 2] =
        [AccountSubtype::Checking, AccountSubtype::CreditCard];

    pub fn is_relevant(&self) -> bool {
        Self::RELEVANT.contains(self)
    }
}

/// An account linked to a Teller enrollment.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) name: String,
    #[serde(rename = "type", default)]
    pub(crate) kind: AccountType,
    #[serde(default)]
    pub(crate) subtype: AccountSubtype,
    #[serde(default)]
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) institution: Institution,
    #[serde(default)]
    pub(crate) links: AccountLinks,
    #[serde(default)]
    pub(crate) enrollment_id: String,
    #[serde(default)]
    pub(crate) currency: String,
    #[serde(default)]
    pub(crate) last_four: String,
}

impl Account {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AccountType {
        self.kind
    }

    pub fn subtype(&self) -> AccountSubtype {
        self.subtype
    }

    pub fn institution(&self) -> &Institution {
        &self.institution
    }

    pub fn links(&self) -> &AccountLinks {
        &self.links
    }

    /// Whether this account's transactions should be ingested.
    pub fn is_relevant(&self) -> bool {
        self.subtype.is_relevant()
    }
}

#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    #[serde(default)]
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) name: String,
}

impl Institution {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Related-resource links. `transactions` may be absolute or relative to the API base URL, and is
/// empty when Teller omits it.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AccountLinks {
    #[serde(default)]
    pub(crate) transactions: String,
    #[serde(rename = "self", default)]
    pub(crate) self_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) balances: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) details: Option<String>,
}

impl AccountLinks {
    pub fn transactions(&self) -> &str {
        &self.transactions
    }

    pub fn self_link(&self) -> &str {
        &self.self_link
    }

    pub fn balances(&self) -> Option<&str> {
        self.balances.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TELLER_ACCOUNT: &str = r#"{
        "type": "depository",
        "subtype": "checking",
        "status": "open",
        "name": "My Checking",
        "links": {
            "transactions": "https://api.teller.io/accounts/acc_oiin624kqjrg2mp2ea000/transactions",
            "self": "https://api.teller.io/accounts/acc_oiin624kqjrg2mp2ea000",
            "details": "https://api.teller.io/accounts/acc_oiin624kqjrg2mp2ea000/details",
            "balances": "https://api.teller.io/accounts/acc_oiin624kqjrg2mp2ea000/balances"
        },
        "last_four": "7857",
        "institution": {"name": "Security Credit Union", "id": "security_cu"},
        "id": "acc_oiin624kqjrg2mp2ea000",
        "enrollment_id": "enr_oiin624rqaojse22oe000",
        "currency": "USD"
    }"#;

    #[test]
    fn test_decode_teller_account() {
        let account: Account = serde_json::from_str(TELLER_ACCOUNT).unwrap();
        assert_eq!(account.id(), "acc_oiin624kqjrg2mp2ea000");
        assert_eq!(account.name(), "My Checking");
        assert_eq!(account.kind(), AccountType::Depository);
        assert_eq!(account.subtype(), AccountSubtype::Checking);
        assert_eq!(account.institution().id(), "security_cu");
        assert_eq!(
            account.links().transactions(),
            "https://api.teller.io/accounts/acc_oiin624kqjrg2mp2ea000/transactions"
        );
        assert!(account.links().balances().is_some());
        assert!(account.is_relevant());
    }

    #[test]
    fn test_decode_minimal_account() {
        let account: Account =
            serde_json::from_str(r#"{"subtype":"savings","id":"a2","links":{"transactions":"/a2/tx"}}"#)
                .unwrap();
        assert_eq!(account.subtype(), AccountSubtype::Savings);
        assert_eq!(account.kind(), AccountType::Unknown);
        assert!(!account.is_relevant());
    }

    #[test]
    fn test_relevant_subtypes() {
        use AccountSubtype::*;
        for subtype in [Checking, CreditCard] {
            assert!(subtype.is_relevant(), "{subtype}");
        }
        for subtype in [
            Savings,
            MoneyMarket,
            CertificateOfDeposit,
            Treasury,
            Sweep,
            Unknown,
        ] {
            assert!(!subtype.is_relevant(), "{subtype}");
        }
    }

    #[test]
    fn test_decode_account_without_links_or_subtype() {
        let account: Account = serde_json::from_str(r#"{"id":"a3","subtype":"savings"}"#).unwrap();
        assert_eq!(account.links().transactions(), "");
        assert!(!account.is_relevant());

        let account: Account = serde_json::from_str(r#"{"id":"a4"}"#).unwrap();
        assert_eq!(account.subtype(), AccountSubtype::Unknown);
        assert!(!account.is_relevant());
    }

    #[test]
    fn test_unknown_subtype_decodes() {
        let subtype: AccountSubtype = serde_json::from_str(r#""brokerage""#).unwrap();
        assert_eq!(subtype, AccountSubtype::Unknown);
    }
}
