//! Validator for the redis-cloud-api skill
//!
//! API reference rules must show, somewhere in the raw markdown:
//!
//! | Check | Accepted forms |
//! |-------|----------------|
//! | endpoint | `**Endpoint:** `GET /path``, inline `` `POST /path` ``, `### GET ...`, an `https://api.redislabs.com/v1/...` URL, or `-X VERB "https://api.redislabs.com...` |
//! | curl | a ```` ```bash ```` fence followed by `curl `, or a `###`/`####` curl heading |
//! | Python | a ```` ```python ```` fence followed by `import`, `requests` or `def `, or a Python heading |
//! | TypeScript | a ```` ```typescript ```` fence followed by a declaration, `async`/`await`, `fetch` or `interface`, or a TypeScript heading |
//! | error table | `**Common Errors:**`, a `##`/`###` Common Errors heading, a `\| Code \| Meaning \|` header, or any `\| NNN \|` cell |
//! | reference | `Reference:`/`References:` followed by a markdown link, or a link into `https://redis.io/docs/` |
//!
//! Keywords match ASCII case-insensitively, so `ſ` never stands in for `s`.
//! Matching is purely textual; the parsed rule fields are not consulted. The
//! status-code cell heuristic also accepts unrelated three-digit cells
//! (ports, years) in any table.

use super::{run_base_validations, RuleValidator};
use crate::{
    diagnostics::ValidationError,
    regex_util::{any_match, static_regex},
    rule::Rule,
};
use regex::Regex;

static_regex!(fn endpoint_label, r"\*\*(?i-u:endpoint):?\*?\*?\s*`?(?i-u:GET|POST|PUT|DELETE|PATCH)\s+/[^`\n]+`?");
static_regex!(fn endpoint_inline, r"`(?i-u:GET|POST|PUT|DELETE|PATCH)\s+/[^`]+`");
static_regex!(fn endpoint_heading, r"###\s+(?i-u:GET|POST|PUT|DELETE|PATCH)\s+");
static_regex!(fn endpoint_api_url, r"(?i-u:https://api\.redislabs\.com/v1/[a-z])");
static_regex!(fn endpoint_curl_method, r#"-(?i-u:X)\s+(?i-u:GET|POST|PUT|DELETE|PATCH)\s+"(?i-u:https://api\.redislabs\.com)"#);
static_regex!(fn curl_block, r"(?i-u:```bash)[\s\S]*?(?i-u:curl)\s");
static_regex!(fn curl_heading, r"#{3,4}\s*(?i-u:curl)");
static_regex!(fn python_block, r"(?i-u:```python)[\s\S]*?(?:(?i-u:import|requests)|(?i-u:def)\s)");
static_regex!(fn python_heading, r"#{3,4}\s*(?i-u:python)");
static_regex!(fn typescript_block, r"(?i-u:```typescript)[\s\S]*?(?i-u:const|let|var|async|await|fetch|interface)");
static_regex!(fn typescript_heading, r"#{3,4}\s*(?i-u:typescript)");
static_regex!(fn common_errors_label, r"\*\*(?i-u:common errors):?\*\*");
static_regex!(fn common_errors_heading, r"###?\s*(?i-u:common errors)");
static_regex!(fn code_meaning_header, r"\|\s*(?i-u:code)\s*\|\s*(?i-u:meaning)\s*\|");
static_regex!(fn status_code_cell, r"\|\s*[0-9]{3}\s*\|");
static_regex!(fn reference_label, r"(?i-u:references?):\s*\[.*?\]\(.*?\)");
static_regex!(fn redis_docs_link, r"\[.*?\]\((?i-u:https://redis\.io/docs/).*?\)");

/// At least one endpoint or API URL reference
pub fn has_endpoint(content: &str) -> bool {
    any_match(
        &[
            endpoint_label,
            endpoint_inline,
            endpoint_heading,
            endpoint_api_url,
            endpoint_curl_method,
        ],
        content,
    )
}

pub fn has_curl_example(content: &str) -> bool {
    any_match(&[curl_block, curl_heading], content)
}

pub fn has_python_example(content: &str) -> bool {
    any_match(&[python_block, python_heading], content)
}

pub fn has_typescript_example(content: &str) -> bool {
    any_match(&[typescript_block, typescript_heading], content)
}

pub fn has_common_errors_table(content: &str) -> bool {
    any_match(
        &[
            common_errors_label,
            common_errors_heading,
            code_meaning_header,
            status_code_cell,
        ],
        content,
    )
}

pub fn has_reference_link(content: &str) -> bool {
    any_match(&[reference_label, redis_docs_link], content)
}

/// Content checks in reporting order, each with its failure message
const CONTENT_CHECKS: &[(fn(&str) -> bool, &str)] = &[
    (
        has_endpoint,
        "Missing endpoint documentation. Rules should document at least one API endpoint (e.g., **Endpoint:** `GET /path`)",
    ),
    (
        has_curl_example,
        "Missing curl example. Each rule should include a curl example",
    ),
    (
        has_python_example,
        "Missing Python example. Each rule should include a Python example",
    ),
    (
        has_typescript_example,
        "Missing TypeScript example. Each rule should include a TypeScript example",
    ),
    (
        has_common_errors_table,
        "Missing Common Errors table. Each rule should include a table of common error codes",
    ),
    (
        has_reference_link,
        "Missing reference link. Each rule should include a reference link to Redis documentation",
    ),
];

pub struct RedisCloudApiValidator;

impl RuleValidator for RedisCloudApiValidator {
    fn name(&self) -> &'static str {
        "redis-cloud-api"
    }

    fn validate_rule(&self, rule: &Rule, file: &str, content: &str) -> Vec<ValidationError> {
        let mut errors = run_base_validations(rule, file, content);

        errors.extend(
            CONTENT_CHECKS
                .iter()
                .filter(|(check, _)| !check(content))
                .map(|(_, message)| ValidationError::new(file, &rule.id, *message)),
        );

        errors
    }
}
