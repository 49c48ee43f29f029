// TF-IDF vectorizer for interest tags
use ahash::AHashMap;

/// English stop words dropped from interest tags
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "etc",
    "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "if", "in", "into", "is", "it", "its", "itself",
    "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on",
    "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same",
    "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Tokenize tag text: lowercase, split on any non-alphanumeric delimiter,
/// drop single characters and stop words
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| s.chars().count() > 1)
        .filter(|s| !STOP_WORDS.contains(s))
        .map(str::to_string)
        .collect()
}

/// Fitted term vocabulary with smoothed inverse document frequencies.
///
/// Terms are kept in alphabetical order; each term owns one dimension.
#[derive(Debug, Clone, Default)]
pub struct TextVectorizer {
    terms: Vec<String>,
    idf: Vec<f32>,
    index: AHashMap<String, usize>,
}

impl TextVectorizer {
    /// Build the vocabulary from a corpus of tag strings, keeping the
    /// `max_features` terms with the highest total frequency
    pub fn fit<'a, I>(documents: I, max_features: usize) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut doc_count = 0usize;
        // term -> (total frequency, document frequency)
        let mut stats: AHashMap<String, (u32, u32)> = AHashMap::new();

        for document in documents {
            doc_count += 1;
            let mut seen: Vec<String> = Vec::new();
            for token in tokenize(document) {
                let entry = stats.entry(token.clone()).or_insert((0, 0));
                entry.0 += 1;
                if !seen.contains(&token) {
                    entry.1 += 1;
                    seen.push(token);
                }
            }
        }

        let mut ranked: Vec<(String, u32, u32)> = stats
            .into_iter()
            .map(|(term, (tf, df))| (term, tf, df))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);
        ranked.sort_by(|a, b| a.0.cmp(&b.0));

        let n = doc_count as f32;
        let idf = ranked
            .iter()
            .map(|(_, _, df)| ((1.0 + n) / (1.0 + *df as f32)).ln() + 1.0)
            .collect();
        let terms: Vec<String> = ranked.into_iter().map(|(term, _, _)| term).collect();

        let mut vectorizer = Self {
            terms,
            idf,
            index: AHashMap::new(),
        };
        vectorizer.rebuild_index();
        vectorizer
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .terms
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i))
            .collect();
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.index.get(term).map(|&i| self.idf[i])
    }

    /// Write the L2-normalized TF-IDF vector of `text` into `out`.
    /// Terms outside the vocabulary are ignored; `out` must be `dim()` long.
    pub fn transform_into(&self, text: &str, out: &mut [f32]) {
        debug_assert_eq!(out.len(), self.dim());
        out.iter_mut().for_each(|x| *x = 0.0);

        for token in tokenize(text) {
            if let Some(&i) = self.index.get(&token) {
                out[i] += self.idf[i];
            }
        }

        let norm: f32 = out.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in out.iter_mut() {
                *x /= norm;
            }
        }
    }

    pub fn transform(&self, text: &str) -> Vec<f32> {
        let mut out = vec![0.0; self.dim()];
        self.transform_into(text, &mut out);
        out
    }
}
