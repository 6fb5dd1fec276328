/// System prompt for summaries
pub const SUMMARY_SYSTEM_PROMPT: &str = "You are an expert at summarizing educational content. \
Create a concise yet comprehensive summary of the given text.";

/// System prompt for multiple-choice quizzes with `count` questions
pub fn quiz_system_prompt(count: usize) -> String {
    format!(
        r#"You are an expert at creating educational quizzes.
Create {count} multiple choice questions based on the given text.
Each question should have 4 options (A, B, C, D) and only one correct answer.
Format the response as a JSON object with the following structure:
{{
    "questions": [
        {{
            "question": "question text",
            "options": ["A. option1", "B. option2", "C. option3", "D. option4"],
            "correct_answer": "A"
        }}
    ]
}}

Rules:
- Return exactly {count} questions
- correct_answer is the letter of the correct option only
- Output ONLY valid JSON, no other text"#
    )
}

/// System prompt for open-ended analytical questions with `count` questions
pub fn analytics_system_prompt(count: usize) -> String {
    format!(
        r#"You are an expert at creating analytical questions that test deep understanding.
Create {count} analytical questions based on the given text. These should be open-ended questions that require
critical thinking and analysis. Format the response as a JSON object with the following structure:
{{
    "questions": [
        {{
            "question": "question text",
            "evaluation_criteria": ["criterion1", "criterion2", "criterion3"]
        }}
    ]
}}

Rules:
- Return exactly {count} questions
- Every question has at least one evaluation criterion
- Output ONLY valid JSON, no other text"#
    )
}

/// System prompt for grading one analytical answer against its criteria
pub fn evaluation_system_prompt(criteria: &[String]) -> String {
    format!(
        r#"You are an expert at evaluating analytical answers.
Evaluate the following answer based on these criteria: {}

Provide:
1. A score from 0-100
2. Specific feedback on how well the answer addresses each criterion
3. Suggestions for improvement
4. A model answer that demonstrates the best way to address the question

Format your response as a JSON object with the following structure:
{{
    "score": 0,
    "feedback": "detailed feedback",
    "suggestions": ["suggestion1", "suggestion2", "suggestion3"],
    "model_answer": "example of a good answer"
}}

Output ONLY valid JSON, no other text"#,
        criteria.join(", ")
    )
}

/// User message for grading one analytical answer
pub fn evaluation_user_prompt(question: &str, answer: &str) -> String {
    format!("Question: {}\n\nAnswer: {}", question, answer)
}
