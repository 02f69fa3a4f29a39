/*
 * Responsibility
 * - API versions; v1 routes are mounted at the root (policy patterns see the same paths)
 */
pub mod v1;
