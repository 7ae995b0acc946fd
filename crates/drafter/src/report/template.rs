//! The report prompt template, versioned as a contract
//!
//! The oracle is asked to fill a fixed set of section headers, and the
//! assembler fills a fixed set of `{slot}` placeholders. Both lists are
//! checked against the template body at compile time, so editing the text
//! cannot silently drop a header or a slot.

use crate::error::{DrafterError, Result};

/// Placeholders the assembler fills, in no particular order
pub const SLOTS: [&str; 7] = [
  "user_query",
  "alert",
  "log",
  "initial_analysis",
  "customer_info",
  "contract_notice",
  "playbook",
];

/// Output headers the oracle must populate
pub const SECTION_HEADERS: [&str; 9] = [
  "Title:",
  "Date:",
  "Severity:",
  "## Alert Summary:",
  "## Key Details:",
  "## Consequence:",
  "# CONTAINMENT",
  "## Executed Remediation Actions:",
  "## Recommended Remediation Actions:",
];

/// Contract policy text; the assembler embeds it, nothing enforces it
pub const EDR_POLICY: &str = "If the customer has mdr_contract_type=EDR then the Tier 1 SOC analyst can only do remediation actions that are endpoint focused. The customer must do the rest.";
pub const XDR_POLICY: &str = "If the customer has mdr_contract_type=XDR then the Tier 1 SOC analyst can do more extensive remediation actions across multiple security layers, like networks or cloud applications.";

pub const NO_SOC_ACTIONS_FALLBACK: &str =
  "No actions applicable by the MDR SOC due to customer contract.";
pub const ALL_ACTIONS_DONE_FALLBACK: &str =
  "All remediation actions have been completed by the MDR SOC.";

/// Contract policy and fallback phrasing every template must carry verbatim
pub const REQUIRED_PHRASES: [&str; 4] =
  [EDR_POLICY, XDR_POLICY, NO_SOC_ACTIONS_FALLBACK, ALL_ACTIONS_DONE_FALLBACK];

const BODY_V1: &str = r#"
You are going to act as an assistant for a Tier 1 MDR SOC analyst.
Your goal is to help the analyst create a template for a SOC report, based on:
1) The initial alert and hypothesis provided by the analyst.
2) The logs that have been tagged as relevant by the analyst.

Return a template for a SOC report based on the input data.

The following data will be input and utilized:

The alert category used to select playbooks:
{user_query}

The SOC analysts got the following alert:
{alert}

The logs that the analyst has tagged as important evidence for the report/incident:
{log}

The Tier 1 SOC analyst has done an initial analysis, and come up with a hypothesis of what this activity is.
This initial analysis and hypothesis will be the foundation for the alert summary:
{initial_analysis}

The client company that has been affected is:
{customer_info}

Based on the customer contract type, different immediate REMEDIATION actions (from the playbook) can be executed by the SOC:
If the customer has mdr_contract_type=EDR then the Tier 1 SOC analyst can only do remediation actions that are endpoint focused. The customer must do the rest.
If the customer has mdr_contract_type=XDR then the Tier 1 SOC analyst can do more extensive remediation actions across multiple security layers, like networks or cloud applications.
{contract_notice}

Use the following playbook information to help generate the report template:
{playbook}

With all this information, fill in the following report template strictly, in a concise way, suitable for sending to a MDR customer.
All parts of the report must be precise, with no unnecessary tangents or unnecessarily complicated wording.
The report should be simple and understandable for MDR customers.

Fill in the following template:
------------------------------------------------------------------------------------------------------------------------------
Title:
Date:
Alert Type/Category: e.g., Attempted Compromise
Severity: Low / Medium / High / Critical
Analyst Name: Let this be blank, for the analyst to fill in
Case #:

# DETECTION AND ANALYSIS

## Alert Summary:
* Write an "Alert Summary" for an MDR SOC report.
Follow these instructions exactly:
1. Heavily base the alert summary on the initial analysis and hypothesis that the analyst has written. If any sources or citations are included, keep them in the text, and include a list of the sources at the end of this section, in its own section called ### References:
2. Begin with a single sentence describing the activity, and where the detection originated (e.g., "Microsoft Defender detected X on the host Y by the user Z.").
3. Provide a brief description of the attack type or tactic, max two sentences. Use internal SOC playbooks or general security knowledge to describe what the attack is and what it aims to achieve.
4. Integrate all key findings and evidence into the summary naturally (no bullet points). Mention relevant details such as processes executed, suspicious commands, domains, user accounts, and observed behavior patterns.
5. If any commands (especially PowerShell) are present, display them in preformatted text on a new line using triple backticks (```command```), followed by a one-sentence explanation of what the command does.
6. Maintain a concise, professional tone without unnecessary "fluff," such as lengthy background explanations or details on log sources.
7. Avoid ending with a one-sentence recap of all findings. This entire section is the summary.
8. Optionally conclude with: "We recommend that you investigate this activity further, as the activity appears to X."
9. The text should read like a single cohesive summary paragraph, not a list or procedural walkthrough. *

## Key Details:
*Write the "Key Details" section for an MDR SOC report.
Follow these instructions exactly:
1. Present each item on a separate line, with no bullet points, numbering, or paragraph text.
2. Each line should follow this consistent format:
   Label: Value (e.g. Host: WIN-123)
3. Use short, descriptive labels like `User:`, `Host:`, `Source IP:`, `Destination IP:`, `Domain:`, `File Path:`, `Command Executed:`, `Process Chain:`, etc.
4. Include ONLY the most relevant technical information from the tagged logs such as:
   - Impacted users, hosts, or systems
   - IP addresses (source/destination)
   - Domains, URLs, or file paths involved
   - PowerShell or script commands executed
   - Process chains observed
   - Event IDs
   - Any other clear indicators of compromise (IOCs) or suspicious activity
If multiple values exist for a single item type (such as several domains or IP addresses), you may use bullet points directly under that label to list them.
5. Do not include where the data originated in this section (e.g., Defender, Sentinel, SIEM, etc.). Only the data itself.
6. Keep entries factual and concise: no sentences, commentary, or explanations unless it is a short clarification (e.g., "Encoded PowerShell command used for payload retrieval").
7. Maintain a consistent, clean layout with one item per line. Avoid extra spacing or markdown formatting beyond basic colons and line breaks.*

## Consequence:
*Describe the potential or confirmed impact of the incident, such as data exposure, privilege escalation, lateral movement, or system compromise. Do not use bullet points here, write it as text.
This section should not include any containment suggestions.*

# CONTAINMENT
* This section should exclusively focus on immediate remediation actions, both those the SOC has done, and those the customer needs to do themselves*

## Executed Remediation Actions:
* Start this section with the following: "The following containment and eradication actions have been performed by our SOC:"
1. Follow this up with a bullet point list of concrete immediate containment and eradication actions that the Tier 1 SOC analyst must do/has done in order to contain, remediate or resolve the identified threat.
2. The immediate actions that the Tier 1 analyst can do are based on the customer contract "mdr_contract_type", and the playbook content.
3. Be very concrete when describing what has been done.
4. Remember, you are only an AI assistant, and you can propose natural steps that the analyst should take, however what they actually do is inevitably up to them.
5. Be brief in wording: (e.g. Isolated the host, due to X) is good enough.
6. If no specific actions can be performed by the SOC (e.g., for EDR customers), you may write: "No actions applicable by the MDR SOC due to customer contract."
*

## Recommended Remediation Actions:
* Start this section with the following: "Our SOC recommends that you do the following containment actions:"
1. Use bullet points to list out concrete immediate containment and eradication actions that the customer must do (that the SOC could not do), in order to contain, remediate or resolve the identified threat.
2. This should only focus on high level, immediate actions.
3. Do not come up with any points regarding strategy, governance and compliance, or similar, here. That is not the scope for these reports. Just concrete actions that need to be taken.
4. If all remediation actions have been completed by the MDR SOC and the report is intended solely to inform the customer (e.g., for XDR customers), you may write: "All remediation actions have been completed by the MDR SOC."
*
"#;

/// `true` when `needle` occurs in `haystack`; usable in const context
const fn contains(haystack: &str, needle: &str) -> bool {
  let h = haystack.as_bytes();
  let n = needle.as_bytes();
  if n.len() > h.len() {
    return false;
  }
  let mut start = 0;
  while start + n.len() <= h.len() {
    let mut i = 0;
    while i < n.len() && h[start + i] == n[i] {
      i += 1;
    }
    if i == n.len() {
      return true;
    }
    start += 1;
  }
  false
}

/// `true` when `{name}` occurs in `haystack`; usable in const context
const fn contains_slot(haystack: &str, name: &str) -> bool {
  let h = haystack.as_bytes();
  let n = name.as_bytes();
  let mut start = 0;
  while start + n.len() + 2 <= h.len() {
    if h[start] == b'{' && h[start + n.len() + 1] == b'}' {
      let mut i = 0;
      while i < n.len() && h[start + 1 + i] == n[i] {
        i += 1;
      }
      if i == n.len() {
        return true;
      }
    }
    start += 1;
  }
  false
}

const fn check_v1() {
  let mut i = 0;
  while i < SLOTS.len() {
    assert!(contains_slot(BODY_V1, SLOTS[i]), "report template v1 is missing a slot");
    i += 1;
  }

  let mut j = 0;
  while j < SECTION_HEADERS.len() {
    assert!(
      contains(BODY_V1, SECTION_HEADERS[j]),
      "report template v1 is missing a section header"
    );
    j += 1;
  }

  let mut k = 0;
  while k < REQUIRED_PHRASES.len() {
    assert!(
      contains(BODY_V1, REQUIRED_PHRASES[k]),
      "report template v1 lost a policy or fallback phrase"
    );
    k += 1;
  }
}

const _: () = check_v1();

/// A prompt template with a version tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportTemplate {
  pub version: &'static str,
  body: &'static str,
}

impl ReportTemplate {
  pub const V1: ReportTemplate = ReportTemplate { version: "v1", body: BODY_V1 };

  /// Build a template from a static body, checking slots and headers at runtime
  pub fn new(version: &'static str, body: &'static str) -> Result<Self> {
    let template = Self { version, body };
    template.validate()?;
    Ok(template)
  }

  pub fn body(&self) -> &'static str {
    self.body
  }

  /// Every slot, section header and required phrase must appear in the body
  pub fn validate(&self) -> Result<()> {
    let missing_slots: Vec<&str> =
      SLOTS.iter().copied().filter(|slot| !contains_slot(self.body, slot)).collect();
    if !missing_slots.is_empty() {
      return Err(DrafterError::template(format!(
        "{} is missing slots: {}",
        self.version,
        missing_slots.join(", ")
      )));
    }

    let missing_headers: Vec<&str> =
      SECTION_HEADERS.iter().copied().filter(|header| !self.body.contains(header)).collect();
    if !missing_headers.is_empty() {
      return Err(DrafterError::template(format!(
        "{} is missing section headers: {}",
        self.version,
        missing_headers.join(", ")
      )));
    }

    if let Some(phrase) = REQUIRED_PHRASES.iter().find(|phrase| !self.body.contains(*phrase)) {
      return Err(DrafterError::template(format!(
        "{} is missing required phrasing: \"{phrase}\"",
        self.version
      )));
    }

    Ok(())
  }

  /// Substitute slots in a single pass; values are never re-scanned, so a
  /// log line containing `{playbook}` stays literal
  pub fn render(&self, value_for: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(self.body.len() * 2);
    let mut rest = self.body;

    while let Some(open) = rest.find('{') {
      out.push_str(&rest[..open]);
      let after = &rest[open + 1..];

      let filled = after.find('}').and_then(|close| {
        let name = &after[..close];
        if SLOTS.contains(&name) {
          value_for(name).map(|value| (value, close))
        } else {
          None
        }
      });

      match filled {
        Some((value, close)) => {
          out.push_str(&value);
          rest = &after[close + 1..];
        }
        None => {
          out.push('{');
          rest = after;
        }
      }
    }

    out.push_str(rest);
    out
  }
}
