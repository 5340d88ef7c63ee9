use crate::shared::validate_request_id;
use crate::store::DecisionVerdict;

const APPROVE_PREFIX: &str = "approve-";
const DENY_PREFIX: &str = "deny-";

pub fn encode_decision_token(verdict: DecisionVerdict, request_id: &str) -> String {
    match verdict {
        DecisionVerdict::Approve => format!("{APPROVE_PREFIX}{request_id}"),
        DecisionVerdict::Deny => format!("{DENY_PREFIX}{request_id}"),
    }
}

pub fn parse_decision_token(raw: &str) -> Result<(DecisionVerdict, String), String> {
    let raw = raw.trim();
    let (verdict, request_id) = if let Some(rest) = raw.strip_prefix(APPROVE_PREFIX) {
        (DecisionVerdict::Approve, rest)
    } else if let Some(rest) = raw.strip_prefix(DENY_PREFIX) {
        (DecisionVerdict::Deny, rest)
    } else {
        return Err(format!(
            "decision token must start with `{APPROVE_PREFIX}` or `{DENY_PREFIX}`"
        ));
    };
    validate_request_id(request_id)?;
    Ok((verdict, request_id.to_string()))
}
