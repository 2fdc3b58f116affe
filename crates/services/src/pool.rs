use rand::Rng;
use rand::seq::SliceRandom;

use study_core::model::Question;

/// Shuffle a copy of `questions` and keep at most `max` from the front.
///
/// The source slice is left untouched.
pub fn select_pool<R: Rng + ?Sized>(questions: &[Question], max: usize, rng: &mut R) -> Vec<Question> {
    let mut pool = questions.to_vec();
    pool.shuffle(rng);
    pool.truncate(max);
    pool
}
