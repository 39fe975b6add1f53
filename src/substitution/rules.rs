use serde::{Deserialize, Serialize};

/// One suggested replacement for an ingredient.
///
/// `ratio` is display text only ("1:1", "3/4 cup honey = 1 cup sugar", ...), it is never parsed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SubstitutionCandidate {
    pub substitute_name: String,
    pub ratio: String,
    pub note: String,
}

impl SubstitutionCandidate {
    pub fn new(substitute_name: &str, ratio: &str, note: &str) -> Self {
        Self {
            substitute_name: substitute_name.to_string(),
            ratio: ratio.to_string(),
            note: note.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SubstitutionRule {
    pub ingredient_key: String,
    // Ranked: first entry is the preferred substitution
    pub candidates: Vec<SubstitutionCandidate>,
}

/// Lowercases and trims an ingredient name, the form rule keys are stored in.
pub fn normalize_ingredient_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Immutable table of curated substitutions, kept in insertion order.
///
/// Lookups try an exact key first, then the first key (in table order) that either
/// contains the query or is contained by it, so "unsalted butter" finds "butter".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRuleTable {
    rules: Vec<SubstitutionRule>,
}

impl SubstitutionRuleTable {
    pub fn from_rules(rules: Vec<SubstitutionRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| SubstitutionRule {
                ingredient_key: normalize_ingredient_name(&rule.ingredient_key),
                candidates: rule.candidates,
            })
            .collect();
        Self { rules }
    }

    pub fn with_defaults() -> Self {
        Self::from_rules(default_rules())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.ingredient_key.as_str())
    }

    /// True when the normalized name is itself a table key (no partial matching).
    pub fn has_exact(&self, name: &str) -> bool {
        let normalized = normalize_ingredient_name(name);
        self.exact(&normalized).is_some()
    }

    pub fn lookup(&self, name: &str) -> Vec<SubstitutionCandidate> {
        let normalized = normalize_ingredient_name(name);
        // "" is a substring of every key, so blank names must stop here
        if normalized.is_empty() {
            return Vec::new();
        }

        if let Some(rule) = self.exact(&normalized) {
            return rule.candidates.clone();
        }

        self.rules
            .iter()
            .find(|rule| {
                normalized.contains(rule.ingredient_key.as_str())
                    || rule.ingredient_key.contains(normalized.as_str())
            })
            .map(|rule| rule.candidates.clone())
            .unwrap_or_default()
    }

    fn exact(&self, normalized: &str) -> Option<&SubstitutionRule> {
        self.rules.iter().find(|rule| rule.ingredient_key == normalized)
    }
}

impl Default for SubstitutionRuleTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn rule(key: &str, candidates: &[(&str, &str, &str)]) -> SubstitutionRule {
    SubstitutionRule {
        ingredient_key: key.to_string(),
        candidates: candidates
            .iter()
            .map(|(name, ratio, note)| SubstitutionCandidate::new(name, ratio, note))
            .collect(),
    }
}

/// The curated table shipped with the client. Order matters for partial matches.
pub fn default_rules() -> Vec<SubstitutionRule> {
    vec![
        // Dairy
        rule(
            "butter",
            &[
                ("Olive Oil", "3/4", "For baking, reduce liquid by 3 tbsp per cup"),
                ("Coconut Oil", "1:1", "Best for baking and sautéing"),
                ("Applesauce", "1/2", "For baking, reduces fat content"),
            ],
        ),
        rule(
            "milk",
            &[
                ("Almond Milk", "1:1", "Unsweetened for savory dishes"),
                ("Oat Milk", "1:1", "Creamy texture, good for baking"),
                ("Coconut Milk", "1:1", "Adds slight coconut flavor"),
                ("Soy Milk", "1:1", "Neutral flavor, high protein"),
            ],
        ),
        rule(
            "heavy cream",
            &[
                ("Coconut Cream", "1:1", "For dairy-free option"),
                ("Cashew Cream", "1:1", "Blend cashews with water"),
                (
                    "Half & Half + Butter",
                    "7/8 cup half & half + 1/8 cup butter",
                    "Closest to heavy cream",
                ),
            ],
        ),
        rule(
            "cream cheese",
            &[
                ("Greek Yogurt", "1:1", "Lower fat, tangy flavor"),
                ("Coconut Cream", "1:1", "Dairy-free option"),
                ("Silken Tofu", "1:1", "Blend until smooth"),
            ],
        ),
        // Flour
        rule(
            "all-purpose flour",
            &[
                (
                    "Whole Wheat Flour",
                    "1:1",
                    "Use 3/4 cup whole wheat + 1/4 cup all-purpose for better texture",
                ),
                ("Almond Flour", "1/4 cup less", "Gluten-free, higher fat"),
                ("Coconut Flour", "1/4", "Highly absorbent, use with eggs"),
                ("Oat Flour", "1:1", "Blend rolled oats to make flour"),
            ],
        ),
        rule(
            "wheat flour",
            &[
                ("Rice Flour", "1:1", "For gluten-free baking"),
                ("Buckwheat Flour", "1:1", "Nutty flavor, gluten-free"),
                ("Quinoa Flour", "1:1", "High protein, mild flavor"),
            ],
        ),
        // Eggs
        rule(
            "egg",
            &[
                ("Flax Egg", "1 tbsp ground flaxseed + 3 tbsp water", "Let sit 5 minutes, equals 1 egg"),
                ("Chia Egg", "1 tbsp chia seeds + 3 tbsp water", "Similar to flax egg"),
                ("Applesauce", "1/4 cup", "For binding in baking"),
                ("Mashed Banana", "1/4 cup", "Adds moisture and sweetness"),
                ("Silken Tofu", "1/4 cup blended", "Good for dense baked goods"),
            ],
        ),
        // Sugar
        rule(
            "white sugar",
            &[
                ("Honey", "3/4 cup honey = 1 cup sugar", "Reduce liquid by 1/4 cup"),
                ("Maple Syrup", "3/4 cup = 1 cup sugar", "Adds maple flavor"),
                ("Coconut Sugar", "1:1", "Similar texture and sweetness"),
                ("Stevia", "1 tsp = 1 cup sugar", "Very concentrated, adjust to taste"),
            ],
        ),
        rule(
            "brown sugar",
            &[
                ("White Sugar + Molasses", "1 cup white sugar + 1 tbsp molasses", "Mix thoroughly"),
                ("Coconut Sugar", "1:1", "Natural brown sugar alternative"),
                ("Maple Syrup", "3/4 cup", "For liquid recipes"),
            ],
        ),
        // Meat
        rule(
            "ground beef",
            &[
                ("Ground Turkey", "1:1", "Leaner option, may need extra seasoning"),
                ("Ground Chicken", "1:1", "Lower fat, similar texture"),
                ("Lentils", "1 cup cooked = 1 lb ground beef", "Plant-based protein"),
                ("Mushrooms", "1:1 by weight", "Umami flavor, great for burgers"),
            ],
        ),
        rule(
            "chicken",
            &[
                ("Tofu", "1:1 by weight", "Marinate for best flavor"),
                ("Tempeh", "1:1 by weight", "Firm texture, high protein"),
                ("Chickpeas", "1:1 by weight", "Great in salads and curries"),
            ],
        ),
        // Oils
        rule(
            "vegetable oil",
            &[
                ("Olive Oil", "1:1", "Use extra virgin for salads, regular for cooking"),
                ("Coconut Oil", "1:1", "Solid at room temp, melt before use"),
                ("Avocado Oil", "1:1", "High smoke point, neutral flavor"),
                ("Canola Oil", "1:1", "Neutral flavor, good for baking"),
            ],
        ),
        // Leavening
        rule(
            "baking powder",
            &[
                (
                    "Baking Soda + Cream of Tartar",
                    "1/4 tsp baking soda + 1/2 tsp cream of tartar = 1 tsp baking powder",
                    "Mix before adding",
                ),
                (
                    "Baking Soda + Buttermilk",
                    "1/4 tsp baking soda = 1 tsp baking powder",
                    "Replace liquid with buttermilk",
                ),
            ],
        ),
        rule(
            "baking soda",
            &[(
                "Baking Powder",
                "3x the amount",
                "Use 3 tsp baking powder = 1 tsp baking soda",
            )],
        ),
        // Vinegar
        rule(
            "white vinegar",
            &[
                ("Apple Cider Vinegar", "1:1", "Milder flavor, slight apple taste"),
                ("Lemon Juice", "1:1", "Adds citrus flavor"),
                ("Rice Vinegar", "1:1", "Milder, slightly sweet"),
            ],
        ),
        rule(
            "balsamic vinegar",
            &[
                ("Red Wine Vinegar + Honey", "1:1 + 1 tsp honey per tbsp", "Mix for similar sweetness"),
                ("Apple Cider Vinegar", "1:1", "Lighter flavor"),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_returns_its_own_candidates_in_order() {
        let table = SubstitutionRuleTable::with_defaults();
        for expected in default_rules() {
            assert_eq!(
                table.lookup(&expected.ingredient_key),
                expected.candidates,
                "key '{}'",
                expected.ingredient_key
            );
        }
    }

    #[test]
    fn test_lookup_normalizes_case_and_whitespace() {
        let table = SubstitutionRuleTable::with_defaults();
        assert_eq!(table.lookup("  Heavy CREAM "), table.lookup("heavy cream"));
        assert_eq!(table.lookup("Egg")[0].substitute_name, "Flax Egg");
    }

    #[test]
    fn test_partial_match_in_both_directions() {
        let table = SubstitutionRuleTable::with_defaults();
        // query contains key
        assert_eq!(table.lookup("unsalted butter"), table.lookup("butter"));
        // key contains query
        assert_eq!(table.lookup("balsamic"), table.lookup("balsamic vinegar"));
    }

    #[test]
    fn test_partial_match_uses_table_order() {
        let table = SubstitutionRuleTable::with_defaults();
        // "butter" is listed before "milk", so it wins for a name containing both
        assert_eq!(table.lookup("buttermilk"), table.lookup("butter"));
        // "milk" precedes "heavy cream"
        assert_eq!(table.lookup("heavy whipping milk"), table.lookup("milk"));
    }

    #[test]
    fn test_unknown_and_blank_names() {
        let table = SubstitutionRuleTable::with_defaults();
        assert!(table.lookup("saffron").is_empty());
        assert!(table.lookup("").is_empty());
        assert!(table.lookup("   ").is_empty());
    }

    #[test]
    fn test_has_exact_ignores_partial_matches() {
        let table = SubstitutionRuleTable::with_defaults();
        assert!(table.has_exact("White Sugar"));
        assert!(!table.has_exact("unsalted butter"));
    }

    #[test]
    fn test_from_rules_normalizes_keys() {
        let table = SubstitutionRuleTable::from_rules(vec![SubstitutionRule {
            ingredient_key: "  Tahini ".to_string(),
            candidates: vec![SubstitutionCandidate::new("Sunflower Seed Butter", "1:1", "Nut-free")],
        }]);
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["tahini"]);
        assert_eq!(table.lookup("TAHINI").len(), 1);
    }
}
