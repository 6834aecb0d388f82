//! Official domain resolution and source credibility

use std::collections::BTreeMap;

use url::Url;

use crate::model::Credibility;

/// Well-known vendors whose official domain differs from a naive guess
const KNOWN_VENDOR_DOMAINS: &[(&str, &[&str])] = &[
    ("slack", &["slack.com"]),
    ("servicenow", &["servicenow.com"]),
    ("leanix", &["leanix.net"]),
    ("salesforce", &["salesforce.com"]),
    ("microsoft", &["microsoft.com"]),
    ("teams", &["microsoft.com"]),
    ("atlassian", &["atlassian.com"]),
    ("jira", &["atlassian.com"]),
    ("confluence", &["atlassian.com"]),
    ("okta", &["okta.com"]),
    ("zoom", &["zoom.us"]),
    ("notion", &["notion.so"]),
    ("asana", &["asana.com"]),
    ("monday", &["monday.com"]),
    ("hubspot", &["hubspot.com"]),
    ("workday", &["workday.com"]),
    ("snowflake", &["snowflake.com"]),
    ("googleworkspace", &["google.com"]),
    ("dropbox", &["dropbox.com"]),
    ("zendesk", &["zendesk.com"]),
    ("github", &["github.com"]),
    ("gitlab", &["gitlab.com"]),
    ("sap", &["sap.com"]),
    ("box", &["box.com"]),
];

/// Second-level labels that form part of a public suffix (e.g. `co.uk`)
const MULTI_PART_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "com.au", "net.au", "org.au", "co.nz", "co.jp",
    "co.in", "co.za", "com.br", "com.mx", "com.sg", "com.cn", "com.tr",
];

/// Forums, social networks and Q&A sites never used as vendor evidence
const COMMUNITY_HOSTS: &[&str] = &[
    "reddit.com",
    "quora.com",
    "stackoverflow.com",
    "stackexchange.com",
    "medium.com",
    "twitter.com",
    "x.com",
    "facebook.com",
    "linkedin.com",
    "youtube.com",
    "tiktok.com",
    "instagram.com",
    "pinterest.com",
    "news.ycombinator.com",
];

/// Analyst firms, review sites and established tech media
const TRUSTED_THIRD_PARTY_DOMAINS: &[&str] = &[
    "gartner.com",
    "forrester.com",
    "idc.com",
    "g2.com",
    "capterra.com",
    "trustradius.com",
    "getapp.com",
    "softwareadvice.com",
    "peerspot.com",
    "techcrunch.com",
    "zdnet.com",
    "theverge.com",
    "wired.com",
    "arstechnica.com",
    "venturebeat.com",
    "techtarget.com",
    "infoworld.com",
    "cio.com",
    "forbes.com",
    "reuters.com",
    "bloomberg.com",
    "wikipedia.org",
];

/// Lowercase alphanumerics of a vendor name ("SAP LeanIX" -> "sapleanix")
pub fn normalize_vendor_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parse a URL or bare host ("acme.com/security") into a URL
pub fn parse_loose_url(value: &str) -> Option<Url> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Url::parse(value)
        .ok()
        .filter(|u| u.host_str().is_some())
        .or_else(|| Url::parse(&format!("https://{}", value)).ok())
        .filter(|u| u.host_str().is_some())
}

/// Registrable domain of a host: the last two labels, or three when the
/// host ends in a multi-part public suffix
pub fn registrable_domain(host: &str) -> Option<String> {
    let host = host.trim().trim_end_matches('.').to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();

    if labels.len() < 2 {
        return None;
    }

    let last_two = labels[labels.len() - 2..].join(".");
    if MULTI_PART_SUFFIXES.contains(&last_two.as_str()) {
        if labels.len() < 3 {
            return None;
        }
        return Some(labels[labels.len() - 3..].join("."));
    }

    Some(last_two)
}

pub fn url_registrable_domain(url: &Url) -> Option<String> {
    url.host_str().and_then(registrable_domain)
}

/// Resolve the vendor's official registrable domains: alias table entries
/// whose keyword matches the name, configured aliases, then the website
pub fn resolve_official_domains(
    vendor_name: &str,
    vendor_website: Option<&str>,
    extra_aliases: &BTreeMap<String, Vec<String>>,
) -> Vec<String> {
    let mut domains: Vec<String> = Vec::new();

    let mut push = |domain: &str| {
        if let Some(d) = registrable_domain(domain)
            && !domains.contains(&d)
        {
            domains.push(d);
        }
    };

    for (keyword, aliases) in extra_aliases {
        if name_matches_keyword(vendor_name, keyword) {
            for domain in aliases {
                push(domain.as_str());
            }
        }
    }

    for (keyword, aliases) in KNOWN_VENDOR_DOMAINS {
        if name_matches_keyword(vendor_name, keyword) {
            for domain in aliases.iter() {
                push(*domain);
            }
        }
    }

    if let Some(host) = vendor_website
        .and_then(parse_loose_url)
        .and_then(|u| u.host_str().map(str::to_string))
    {
        push(host.as_str());
    }

    domains
}

/// A keyword matches the whole normalized name or one of its words, so
/// "Dropbox" does not match "box"
fn name_matches_keyword(vendor_name: &str, keyword: &str) -> bool {
    let keyword = normalize_vendor_name(keyword);
    if keyword.is_empty() {
        return false;
    }
    normalize_vendor_name(vendor_name) == keyword
        || vendor_name
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word.to_lowercase() == keyword)
}

/// Host belongs to a forum/social site or a configured deny entry
pub fn is_community_host(url: &Url, extra_deny: &[String]) -> bool {
    let Some(host) = url.host_str().map(str::to_lowercase) else {
        return true;
    };
    let host = host.strip_prefix("www.").unwrap_or(&host);

    COMMUNITY_HOSTS
        .iter()
        .any(|h| host == *h || host.ends_with(&format!(".{}", h)))
        || extra_deny
            .iter()
            .any(|d| !d.is_empty() && host.contains(&d.to_lowercase()))
}

/// Classify a source URL for one vendor
pub fn classify_credibility(
    url: &Url,
    official_domains: &[String],
    normalized_vendor_name: &str,
) -> Credibility {
    let domain = url_registrable_domain(url);

    if let Some(domain) = &domain
        && official_domains.iter().any(|d| d == domain)
    {
        return Credibility::Official;
    }

    // Fallback: vendor name in the URL, e.g. docs hosted on a CDN subdomain
    if normalized_vendor_name.len() >= 3
        && url.as_str().to_lowercase().contains(normalized_vendor_name)
    {
        return Credibility::Official;
    }

    match domain {
        Some(d) if TRUSTED_THIRD_PARTY_DOMAINS.contains(&d.as_str()) => {
            Credibility::ThirdPartyTrusted
        }
        _ => Credibility::Community,
    }
}

/// URL form used for deduplication
pub fn normalize_url(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    let mut s = url.to_string();
    while s.ends_with('/') {
        s.pop();
    }
    s.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_registrable_domain() {
        assert_eq!(registrable_domain("www.slack.com"), Some("slack.com".into()));
        assert_eq!(registrable_domain("trust.acme.io"), Some("acme.io".into()));
        assert_eq!(registrable_domain("shop.acme.co.uk"), Some("acme.co.uk".into()));
        assert_eq!(registrable_domain("co.uk"), None);
        assert_eq!(registrable_domain("localhost"), None);
    }

    #[test]
    fn test_resolve_known_vendor_and_website() {
        let domains = resolve_official_domains("SAP LeanIX", None, &BTreeMap::new());
        assert_eq!(domains, vec!["leanix.net".to_string(), "sap.com".to_string()]);

        let domains =
            resolve_official_domains("Acme Cloud", Some("www.acme.com/home"), &BTreeMap::new());
        assert_eq!(domains, vec!["acme.com".to_string()]);

        let domains = resolve_official_domains("Dropbox", None, &BTreeMap::new());
        assert_eq!(domains, vec!["dropbox.com".to_string()]);

        let domains = resolve_official_domains("Google Workspace", None, &BTreeMap::new());
        assert_eq!(domains, vec!["google.com".to_string()]);
    }

    #[test]
    fn test_resolve_configured_alias_first() {
        let mut aliases = BTreeMap::new();
        aliases.insert("Acme".to_string(), vec!["acmecloud.io".to_string()]);

        let domains =
            resolve_official_domains("Acme Cloud", Some("https://acme.com"), &aliases);
        assert_eq!(domains, vec!["acmecloud.io".to_string(), "acme.com".to_string()]);
    }

    #[test]
    fn test_classify_official_by_domain() {
        let official = vec!["acme.com".to_string()];
        assert_eq!(
            classify_credibility(&url("https://trust.acme.com/soc2"), &official, "acmecloud"),
            Credibility::Official
        );
    }

    #[test]
    fn test_classify_official_by_name_fallback() {
        assert_eq!(
            classify_credibility(&url("https://cdn.example.net/globex/security.pdf"), &[], "globex"),
            Credibility::Official
        );
        // Too short to be a meaningful match
        assert_eq!(
            classify_credibility(&url("https://example.net/hr/x"), &[], "hr"),
            Credibility::Community
        );
    }

    #[test]
    fn test_classify_third_party_and_community() {
        let official = vec!["acme.com".to_string()];
        assert_eq!(
            classify_credibility(&url("https://www.g2.com/products/x/reviews"), &official, "zzz"),
            Credibility::ThirdPartyTrusted
        );
        assert_eq!(
            classify_credibility(&url("https://someblog.dev/post"), &official, "zzz"),
            Credibility::Community
        );
    }

    #[test]
    fn test_community_hosts() {
        assert!(is_community_host(&url("https://old.reddit.com/r/sysadmin"), &[]));
        assert!(is_community_host(&url("https://x.com/acme"), &[]));
        assert!(!is_community_host(&url("https://netbox.com/"), &[]));
        assert!(is_community_host(
            &url("https://www.glassdoor.com/x"),
            &["glassdoor".to_string()]
        ));
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url(&url("https://Acme.com/Trust/#soc2")),
            normalize_url(&url("https://acme.com/Trust"))
        );
    }
}
