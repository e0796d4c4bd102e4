//! System prompt and policy facts for the remote completion service
//!
//! The same policy facts feed two places: the system prompt sent with every
//! completion request, and the local `search_policy` tool the model may call.

/// Plan reference facts, one per line
pub static POLICY_FACTS: &[&str] = &[
    "Plan: SPD275958-8 2024-25 Benefit Booklet, Anthem PPO Plan, PPO Network",
    "Plan: University of California Student Health Insurance Plan (UC SHIP), UC Davis students and dependents, 2024-25",
    "Contact: UC Davis Student Health and Counseling Services: 1-530-752-2349",
    "Contact: Appointments: 1-530-752-2349",
    "Contact: Counseling and psychological services / Advice Nurse: 1-530-752-2349",
    "Contact: After Hours: 1-800-391-2793",
    "Contact: UC SHIP Member Services: 1-866-940-8306",
    "Contact: Academic Health Plans (AHP): 1-855-427-3167, ucship@ahpservice.com",
    "Contact: LiveHealth Online: 1-888-548-3432",
    "Contact: Anthem Nurseline: 1-877-351-3457",
    "Contact: Future Moms: 1-866-664-5404",
    "Location: SHCS Medical Services, Student Health & Wellness Center, 930 Blue Ridge Road, across the street from the ARC",
    "Location: SHCS Counseling Services, 219 North Hall, next to Dutton Hall and South Hall",
];

const PERSONA: &str = "\
You are SHIPSmart, a helpful assistant for UC SHIP (University of California Student Health Insurance Plan) members.
Your role is to:
1. Help students understand their health insurance benefits
2. Assist with finding in-network providers
3. Explain coverage details and limitations
4. Guide through the claims process
5. Help with appointment scheduling
6. Answer general health insurance questions

Always be professional and friendly, clear and concise, accurate with insurance information, and patient with questions.
Reference specific policy numbers and contact information when relevant.
If you're unsure about specific coverage details, direct the student to the appropriate contact number.
Use the search_policy tool to look up plan facts you are not sure about.";

/// Build the default system prompt
///
/// # Examples
///
/// ```
/// use shipsmart::prompts::system_prompt::generate_system_prompt;
///
/// let prompt = generate_system_prompt();
/// assert!(prompt.contains("SHIPSmart"));
/// assert!(prompt.contains("1-866-940-8306"));
/// ```
pub fn generate_system_prompt() -> String {
    let mut prompt = String::from(PERSONA);
    prompt.push_str("\n\nPolicy information:\n");
    for fact in POLICY_FACTS {
        prompt.push_str("- ");
        prompt.push_str(fact);
        prompt.push('\n');
    }
    prompt
}

/// Answer a `search_policy` tool call from the local policy facts
///
/// Returns every fact sharing at least one word (of three or more letters)
/// with the query, or a pointer to Member Services when nothing matches.
pub fn search_policy(query: &str) -> String {
    let terms: Vec<String> = crate::nlp::tokenize(query)
        .into_iter()
        .filter(|term| term.len() >= 3)
        .collect();

    let matches: Vec<&str> = POLICY_FACTS
        .iter()
        .copied()
        .filter(|fact| {
            let fact = fact.to_lowercase();
            terms.iter().any(|term| fact.contains(term.as_str()))
        })
        .collect();

    if matches.is_empty() {
        format!(
            "No policy information found for: {}. Suggest contacting UC SHIP Member Services at 1-866-940-8306.",
            query
        )
    } else {
        matches.join("\n")
    }
}
