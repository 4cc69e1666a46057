/*
 *  Copyright 2025-2026 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Retry/backoff policy.
//!
//! A pure decision function: given how often a job has failed, its frozen
//! retry ceiling and the currently configured backoff base, decide whether
//! the job retries (and after what delay) or moves to the dead-letter queue.
//! The base is read from configuration at failure time, so operator changes
//! apply to the next evaluation, never retroactively to past delays.

use std::time::Duration;

/// Outcome of evaluating a failed execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Schedule another attempt after the backoff delay.
    Retry {
        /// The attempt count to persist (failures so far including this one)
        attempts: i32,
        /// Exponential backoff delay before the job is claimable again
        delay: Duration,
    },
    /// Retry ceiling exceeded; park the job in the dead-letter queue.
    Dead {
        /// The attempt count that crossed the ceiling
        attempts: i32,
    },
}

/// Evaluates a failed attempt.
///
/// `attempts` is the failure count persisted on the job *before* this
/// attempt. The delay is `backoff_base ^ current_attempts` seconds, integer
/// exponentiation with no cap (saturating only at the integer limit).
///
/// A ceiling of zero means the first failure is final: `current_attempts`
/// (1) exceeds `max_retries` (0) immediately.
pub fn evaluate(attempts: i32, max_retries: i32, backoff_base: u32) -> RetryDecision {
    let current_attempts = attempts + 1;
    if current_attempts > max_retries {
        RetryDecision::Dead {
            attempts: current_attempts,
        }
    } else {
        let delay_secs = u64::from(backoff_base).saturating_pow(current_attempts as u32);
        RetryDecision::Retry {
            attempts: current_attempts,
            delay: Duration::from_secs(delay_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_is_exactly_base_to_the_attempt() {
        for k in 0..6 {
            match evaluate(k, 10, 2) {
                RetryDecision::Retry { attempts, delay } => {
                    assert_eq!(attempts, k + 1);
                    assert_eq!(delay, Duration::from_secs(2u64.pow((k + 1) as u32)));
                }
                RetryDecision::Dead { .. } => panic!("ceiling not reached yet"),
            }
        }
    }

    #[test]
    fn test_backoff_is_strictly_increasing_for_base_above_one() {
        let mut last = Duration::ZERO;
        for k in 0..8 {
            if let RetryDecision::Retry { delay, .. } = evaluate(k, 100, 3) {
                assert!(delay > last);
                last = delay;
            }
        }
    }

    #[test]
    fn test_dead_exactly_on_the_attempt_after_the_ceiling() {
        let max_retries = 3;
        // Failures 1..=3 retry, the 4th is final.
        for attempts in 0..max_retries {
            assert!(matches!(
                evaluate(attempts, max_retries, 2),
                RetryDecision::Retry { .. }
            ));
        }
        assert_eq!(
            evaluate(max_retries, max_retries, 2),
            RetryDecision::Dead {
                attempts: max_retries + 1
            }
        );
    }

    #[test]
    fn test_zero_ceiling_is_dead_on_first_failure() {
        assert_eq!(evaluate(0, 0, 2), RetryDecision::Dead { attempts: 1 });
    }

    #[test]
    fn test_base_change_applies_to_the_next_evaluation() {
        // Same job, operator flips backoff_base between failures.
        assert_eq!(
            evaluate(0, 5, 2),
            RetryDecision::Retry {
                attempts: 1,
                delay: Duration::from_secs(2)
            }
        );
        assert_eq!(
            evaluate(1, 5, 10),
            RetryDecision::Retry {
                attempts: 2,
                delay: Duration::from_secs(100)
            }
        );
    }

    #[test]
    fn test_huge_attempt_counts_saturate_instead_of_overflowing() {
        if let RetryDecision::Retry { delay, .. } = evaluate(200, i32::MAX, 2) {
            assert_eq!(delay, Duration::from_secs(u64::MAX));
        } else {
            panic!("expected retry");
        }
    }
}
