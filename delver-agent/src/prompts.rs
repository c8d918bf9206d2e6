//! Prompt templates for the research agent
//!
//! All model calls that expect structured output spell out the exact JSON
//! schema in the prompt; the structured caller handles minor formatting noise
//! on the way back.

/// System instruction for every research call, stamped with the current date
pub fn system_prompt() -> String {
    format!(
        "You are an expert researcher. Today is {}. Follow these instructions when responding:\n\
         - You may be asked to research subjects that are after your knowledge cutoff; assume the user is right when presented with news.\n\
         - The user is a highly experienced analyst, no need to simplify, be as detailed as possible and make sure your response is correct.\n\
         - Be highly organized.\n\
         - Suggest solutions that the user didn't think about.\n\
         - Be proactive and anticipate the user's needs.\n\
         - Treat the user as an expert in all subject matter.\n\
         - Mistakes erode trust, so be accurate and thorough.\n\
         - Value good arguments over authorities, the source is irrelevant.\n\
         - Consider new technologies and contrarian ideas, not just the conventional wisdom.\n\
         - You may use high levels of speculation or prediction, just flag it.",
        chrono::Utc::now().format("%Y-%m-%d")
    )
}

/// Prompt for generating diversified SERP queries from a research topic
pub fn serp_queries_prompt(topic: &str, num_queries: usize, learnings: &[String]) -> String {
    let learnings_block = if learnings.is_empty() {
        String::new()
    } else {
        let bullets: Vec<String> = learnings.iter().map(|l| format!("- {}", l)).collect();
        format!(
            "\nHere are some learnings from previous research, use them to generate more specific queries:\n{}\n",
            bullets.join("\n")
        )
    };

    format!(
        "Given the following prompt from the user, generate a list of SERP queries to research the topic. \
         Return a maximum of {num_queries} queries, but feel free to return less if the original prompt is clear. \
         Make sure each query is unique and not similar to the others: <prompt>{topic}</prompt>\n\
         {learnings_block}\n\
         You must return the result strictly as a JSON array matching the following schema:\n\
         <schema>\n\
         ```json\n\
         [\n\
           {{\n\
             \"query\": \"string, the SERP query\",\n\
             \"research_goal\": \"string, first state the goal of the research this query is meant to accomplish, then go deeper into how to advance the research once results are found, mentioning additional research directions. Be as specific as possible.\"\n\
           }}\n\
         ]\n\
         ```\n\
         </schema>"
    )
}

/// Prompt for extracting learnings and follow-up questions from search contents
pub fn serp_analysis_prompt(
    query: &str,
    contents: &[String],
    max_learnings: usize,
    max_follow_ups: usize,
) -> String {
    format!(
        "Given the following contents from a SERP search for the query <query>{query}</query>, \
         generate a list of learnings from the contents. \
         Return a maximum of {max_learnings} learnings, but feel free to return less if the contents are clear. \
         Make sure each learning is unique and not similar to the others. \
         The learnings should be concise and to the point, as detailed and information dense as possible. \
         Make sure to include any entities like people, places, companies, products, things, etc. in the learnings, \
         as well as any exact metrics, numbers, or dates. \
         The learnings will be used to research the topic further.\n\n\
         <contents>{contents}</contents>\n\n\
         You must return the result strictly as a JSON object matching the following schema:\n\
         <schema>\n\
         ```json\n\
         {{\n\
             \"learnings\": \"list[str], list of learnings, max of {max_learnings}\",\n\
             \"follow_up_questions\": \"list[str], list of follow-up questions to research the topic further, max of {max_follow_ups}\"\n\
         }}\n\
         ```\n\
         </schema>",
        contents = contents.join("\n"),
    )
}

/// Prompt for the per-page content cleaning pass (plain text response)
pub fn content_cleaning_prompt(content: &str) -> String {
    format!(
        "Refine and clean the following page content: remove boilerplate, navigation noise and \
         stray markup, and produce a dense summary that preserves every substantive fact, \
         entity, metric and date. Respond with the cleaned text only:\n{}",
        content
    )
}

/// Prompt for the long-form final report
pub fn final_report_prompt(topic: &str, learnings_block: &str) -> String {
    format!(
        "Given the following prompt from the user, write a final report on the topic using the learnings from research. \
         Make it as detailed as possible, aim for 3 or more pages, include ALL the learnings from research:\n\n\
         <prompt>{topic}</prompt>\n\n\
         Here are all the learnings from previous research:\n\n\
         <learnings>\n{learnings_block}\n</learnings>\n\n\
         You must return the result strictly as a JSON object matching the following schema:\n\
         <schema>\n\
         ```json\n\
         {{\n\
             \"report_markdown\": \"str, final report on the topic in Markdown format, as detailed as possible, include ALL the learnings from research.\"\n\
         }}\n\
         ```\n\
         </schema>"
    )
}

/// Prompt for the short exact answer
pub fn final_answer_prompt(topic: &str, learnings_block: &str) -> String {
    format!(
        "Given the following prompt from the user, write a final answer on the topic using the learnings from research. \
         Follow the format specified in the prompt. Do not include any other text than the answer besides the format specified in the prompt. \
         Keep the answer as concise as possible - usually it should be just a few words or maximum a sentence. \
         Try to follow the format specified in the prompt (for example, if the prompt is using LaTeX, the answer should be in LaTeX; \
         if the prompt gives multiple answer choices, the answer should be one of the choices).\n\n\
         <prompt>{topic}</prompt>\n\n\
         Here are all the learnings from research on the topic that you can use to help answer the prompt:\n\n\
         <learnings>\n{learnings_block}\n</learnings>\n\n\
         You must return the result strictly as a JSON object matching the following schema:\n\
         <schema>\n\
         ```json\n\
         {{\n\
             \"exact_answer\": \"str, the final answer, short and concise, just the answer, no other text.\"\n\
         }}\n\
         ```\n\
         </schema>"
    )
}

/// Prompt for clarifying questions before the research run starts
pub fn clarifying_questions_prompt(topic: &str, max_questions: usize) -> String {
    format!(
        "Given the following query from the user, ask some follow up questions to clarify the research direction. \
         Return a maximum of {max_questions} questions, but feel free to return less if the original query is clear: \
         <query>{topic}</query>\n\n\
         You must return the result strictly as a JSON object matching the following schema:\n\
         <schema>\n\
         ```json\n\
         {{\n\
             \"questions\": \"list[str], follow up questions to clarify the research direction, max of {max_questions}\"\n\
         }}\n\
         ```\n\
         </schema>"
    )
}
