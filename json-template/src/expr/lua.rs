//! Lua-backed default-value evaluator
//!
//! Each evaluation runs `return <source>` in a fresh Lua state with only the
//! table, string, math and utf8 libraries loaded. The chunk environment holds
//! those libraries plus the top-level entries of the scope, so nothing else
//! is reachable. Memory and instruction budgets bound every evaluation.

use mlua::{HookTriggers, Lua, LuaOptions, LuaSerdeExt, StdLib, Table};

use super::{EvalError, Evaluator};
use crate::value::Value;

const SAFE_LIBS: [&str; 4] = ["table", "string", "math", "utf8"];

/// Evaluates default values as Lua expressions
#[derive(Debug, Clone, Copy)]
pub struct LuaEvaluator {
    memory_limit: usize,
    instruction_limit: u32,
}

impl Default for LuaEvaluator {
    fn default() -> Self {
        // 16MB is plenty for a single expression
        Self {
            memory_limit: 16 * 1024 * 1024,
            instruction_limit: 1_000_000,
        }
    }
}

impl LuaEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the memory a single evaluation may allocate
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = bytes;
        self
    }

    /// Abort an evaluation after roughly this many VM instructions
    pub fn with_instruction_limit(mut self, instructions: u32) -> Self {
        self.instruction_limit = instructions.max(1);
        self
    }

    fn environment(&self, lua: &Lua, scope: &Value) -> mlua::Result<Table> {
        let env = lua.create_table()?;
        let globals = lua.globals();
        for name in SAFE_LIBS {
            env.set(name, globals.get::<mlua::Value>(name)?)?;
        }

        if let Value::Object(entries) = scope {
            for (key, value) in entries {
                env.set(key.as_str(), lua.to_value(&value.to_json())?)?;
            }
        }

        Ok(env)
    }
}

impl Evaluator for LuaEvaluator {
    fn evaluate(&self, source: &str, scope: &Value) -> Result<Value, EvalError> {
        // Create Lua with limited standard libraries (no io, os, debug, etc.)
        let lua = Lua::new_with(
            StdLib::TABLE | StdLib::STRING | StdLib::MATH | StdLib::UTF8,
            LuaOptions::default(),
        )?;
        lua.set_memory_limit(self.memory_limit)?;
        lua.set_hook(
            HookTriggers::new().every_nth_instruction(self.instruction_limit),
            |_, _| Err(mlua::Error::runtime("instruction limit exceeded")),
        );

        let env = self.environment(&lua, scope)?;
        let result: mlua::Value = lua
            .load(format!("return {}", source))
            .set_name("default")
            .set_environment(env)
            .eval()?;

        let json: serde_json::Value = lua.from_value(result)?;
        Ok(Value::from(json))
    }
}

impl From<mlua::Error> for EvalError {
    fn from(err: mlua::Error) -> Self {
        EvalError::Eval(err.to_string())
    }
}
