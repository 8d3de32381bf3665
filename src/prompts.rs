pub const SKILL_SYSTEM: &str = include_str!("../data/prompts/skill_system.txt");
pub const SKILL_SYSTEM_LABELLED: &str = include_str!("../data/prompts/skill_system_labelled.txt");
pub const SKILL_USER: &str = include_str!("../data/prompts/skill_user.txt");
pub const GLASSES_USER: &str = include_str!("../data/prompts/glasses_user.txt");
pub const AVATAR_EDIT: &str = include_str!("../data/prompts/avatar_edit.txt");
pub const EYEWEAR_KEEP: &str = include_str!("../data/prompts/eyewear_keep.txt");
pub const EYEWEAR_NONE: &str = include_str!("../data/prompts/eyewear_none.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        assert_eq!(render("{{a}} and {{b}}", &[("a", "cats")]), "cats and {{b}}");
    }

    #[test]
    fn test_prompts_are_non_empty() {
        for prompt in [
            SKILL_SYSTEM,
            SKILL_SYSTEM_LABELLED,
            SKILL_USER,
            GLASSES_USER,
            AVATAR_EDIT,
            EYEWEAR_KEEP,
            EYEWEAR_NONE,
        ] {
            assert!(!prompt.trim().is_empty());
        }
    }

    #[test]
    fn test_skill_user_has_intro_placeholder() {
        assert!(SKILL_USER.contains("{{intro}}"));
    }

    #[test]
    fn test_skill_system_requests_json_shape() {
        for field in ["\"name\"", "\"tagline\"", "\"description\""] {
            assert!(SKILL_SYSTEM.contains(field));
        }
    }

    #[test]
    fn test_labelled_system_lists_every_label() {
        for label in ["技名：", "キャッチコピー：", "説明："] {
            assert!(SKILL_SYSTEM_LABELLED.contains(label));
        }
    }

    #[test]
    fn test_avatar_edit_has_eyewear_placeholder() {
        assert!(AVATAR_EDIT.contains("{{eyewear}}"));
    }

    #[test]
    fn test_glasses_question_demands_yes_or_no() {
        assert!(GLASSES_USER.contains("YES"));
        assert!(GLASSES_USER.contains("NO"));
    }
}
