//! Prompt templates for the sentence generator. The instructions restate
//! the 11-unit limit, but the gateway still filters the response — the
//! model does not always obey.

use crate::gateway::SentenceRequest;

pub fn korean_prompt(req: &SentenceRequest) -> String {
    format!(
        "You are an AI assistant helping elementary school teachers generate \
         dictation sentences.\n\n\
         Generate {count} Korean dictation sentences for grade {grade} students.\n\
         The dictation goal is: {goal}.\n\
         The difficulty level is: {difficulty}.\n\n\
         Each sentence should be no more than 11 characters long (including spaces).\n\
         Sentences should be appropriate for the specified grade level and dictation goal.\n\
         Sentences should match the specified difficulty level, using vocabulary \
         appropriate for that level.\n\n\
         Return the sentences as a JSON array of strings.",
        count = req.sentence_count,
        grade = req.grade_level,
        goal = req.goal,
        difficulty = req.difficulty.as_korean(),
    )
}

pub fn english_prompt(req: &SentenceRequest) -> String {
    format!(
        "You are an AI assistant helping Korean elementary school teachers \
         generate English dictation sentences.\n\n\
         Generate {count} short English dictation sentences or phrases for grade \
         {grade} students learning English as a foreign language.\n\
         The dictation goal is: {goal}.\n\
         The difficulty level is: {difficulty}.\n\n\
         Each sentence must be no more than 11 characters long, counting every \
         letter, space, and punctuation mark.\n\
         Use simple, common words suited to the goal (e.g. phonics patterns or \
         sight words).\n\n\
         Return the sentences as a JSON array of strings.",
        count = req.sentence_count,
        grade = req.grade_level,
        goal = req.goal,
        difficulty = req.difficulty.as_korean(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Difficulty;

    fn request() -> SentenceRequest {
        SentenceRequest {
            grade_level: 2,
            goal: "받침 있는 글자".to_string(),
            difficulty: Difficulty::Normal,
            sentence_count: 5,
        }
    }

    #[test]
    fn test_korean_prompt_carries_all_parameters() {
        let p = korean_prompt(&request());
        assert!(p.contains("Generate 5 Korean dictation sentences"));
        assert!(p.contains("grade 2"));
        assert!(p.contains("받침 있는 글자"));
        assert!(p.contains("보통"));
        assert!(p.contains("JSON array of strings"));
    }

    #[test]
    fn test_english_prompt_carries_all_parameters() {
        let mut req = request();
        req.goal = "sight words".to_string();
        let p = english_prompt(&req);
        assert!(p.contains("English dictation sentences"));
        assert!(p.contains("sight words"));
        assert!(p.contains("no more than 11 characters"));
    }
}
