//! The shunting-yard expression engine.
//!
//! Two stacks: operands (finished subtrees, or a comma block still growing)
//! and operators (table rows plus two kinds of parenthesis marker). A
//! `want_operator` flag alternates between the operand and operator grammar;
//! it also drives the lexer's `no_ops` flag, cleared right after an operand
//! so the next characters may lex as an operator, set again after every
//! operator and at the end of the expression.
//!
//! Reductions are typed: popping an operator consumes its operands, checks
//! the operand-type pairing, and pushes a node carrying the selected opcode.
//! The comma operator instead grows a block, which is how a call's argument
//! list arrives at its closing parenthesis as a single operand.

use log::trace;
use quakec_base::SourcePos;

use super::op::{self, OperId, OperInfo};
use super::Parser;
use crate::ast::{BlockBuilder, Expr};
use crate::cursor::TokenSource;
use crate::error::{ErrorKind, ParseResult};
use crate::token::TokenKind;
use crate::types::{BinaryOp, StoreOp, TypeKind};

/// An operand-stack entry: a finished subtree or a growing comma block.
enum Operand<'a> {
    Expr(&'a Expr<'a>),
    Block(BlockBuilder<'a>),
}

/// An operator-stack entry.
#[derive(Clone, Copy)]
enum OpEntry {
    /// An operator awaiting reduction.
    Oper { info: &'static OperInfo, pos: SourcePos },
    /// A grouping parenthesis.
    Paren { pos: SourcePos },
    /// A call-open parenthesis; `fid` is the callee's operand-stack index.
    CallParen { pos: SourcePos, fid: usize },
}

struct Shunt<'a> {
    out: Vec<Operand<'a>>,
    ops: Vec<OpEntry>,
}

/// Expression parsing, as an extension of [`Parser`].
pub trait ExpressionParsing<'a> {
    /// Parses one expression, consuming its terminating `;`.
    fn parse_expression(&mut self) -> ParseResult<&'a Expr<'a>>;
}

impl<'a, 'i, S: TokenSource> ExpressionParsing<'a> for Parser<'a, 'i, S> {
    fn parse_expression(&mut self) -> ParseResult<&'a Expr<'a>> {
        let result = self.shunt_expression();
        // Whatever happened, expression context is over.
        self.source.set_no_ops(true);
        result
    }
}

impl<'a, 'i, S: TokenSource> Parser<'a, 'i, S> {
    fn shunt_expression(&mut self) -> ParseResult<&'a Expr<'a>> {
        let mut sy = Shunt {
            out: Vec::new(),
            ops: Vec::new(),
        };
        let mut want_operator = false;

        loop {
            if !want_operator {
                let mut next_want = true;
                let pos = self.pos();
                match self.tok().kind {
                    TokenKind::Ident(name) => {
                        let Some(var) = self.find_var(name) else {
                            let msg =
                                format!("unknown identifier '{}'", self.interner.resolve(name));
                            return Err(self.error(ErrorKind::Symbolic, msg));
                        };
                        sy.out.push(Operand::Expr(var));
                    }
                    TokenKind::FloatConst(f) => {
                        let node = self.pool.intern_float(pos, f);
                        sy.out.push(Operand::Expr(node));
                    }
                    TokenKind::IntConst(n) => {
                        let node = self.pool.intern_float(pos, n as f64);
                        sy.out.push(Operand::Expr(node));
                    }
                    TokenKind::StringConst(s) => {
                        let node = self.pool.intern_string(pos, s);
                        sy.out.push(Operand::Expr(node));
                    }
                    TokenKind::VectorConst(v) => {
                        let node = self.pool.intern_vector(pos, v);
                        sy.out.push(Operand::Expr(node));
                    }
                    TokenKind::Punct('(') => {
                        next_want = false;
                        sy.ops.push(OpEntry::Paren { pos });
                    }
                    // A `)` while expecting an operand is only legal as the
                    // close of an argument-less call.
                    TokenKind::Punct(')') => self.close_paren(&mut sy, true)?,
                    _ => {
                        let msg = format!("expected expression, found {}", self.describe_current());
                        return Err(self.error(ErrorKind::Syntactic, msg));
                    }
                }
                want_operator = next_want;
                self.source.set_no_ops(!want_operator);
            } else {
                let pos = self.pos();
                match self.tok().kind {
                    TokenKind::Punct('(') => {
                        // The function-call operator: tag the callee's index.
                        if sy.out.is_empty() {
                            return Err(
                                self.error(ErrorKind::Internal, "call operator without a callee")
                            );
                        }
                        sy.ops.push(OpEntry::CallParen {
                            pos,
                            fid: sy.out.len() - 1,
                        });
                    }
                    TokenKind::Punct(')') => self.close_paren(&mut sy, false)?,
                    TokenKind::Operator(spelling) => {
                        let found = op::find_infix(self.interner.resolve(spelling));
                        let Some(info) = found else {
                            let msg =
                                format!("unknown operator '{}'", self.interner.resolve(spelling));
                            return Err(self.error(ErrorKind::Syntactic, msg));
                        };
                        loop {
                            let reduce_top = match sy.ops.last() {
                                Some(&OpEntry::Oper { info: top, .. }) => info.yields_to(top),
                                _ => false,
                            };
                            if !reduce_top {
                                break;
                            }
                            self.reduce(&mut sy)?;
                        }
                        sy.ops.push(OpEntry::Oper { info, pos });
                    }
                    _ => {
                        let msg = format!(
                            "expected operator or end of statement, found {}",
                            self.describe_current()
                        );
                        return Err(self.error(ErrorKind::Syntactic, msg));
                    }
                }
                want_operator = false;
                self.source.set_no_ops(true);
            }

            if !self.next() {
                return Err(self.error(ErrorKind::Lexical, "unexpected end of file in expression"));
            }
            if self.tok().is_punct(';') {
                break;
            }
        }

        // Consume the terminator; the statement after it must exist, because
        // an expression can only appear inside a still-open block.
        if !self.next() {
            return Err(self.error(ErrorKind::Lexical, "unexpected end of file after expression"));
        }

        while !sy.ops.is_empty() {
            self.reduce(&mut sy)?;
        }

        match sy.out.pop() {
            None => Err(self.error(ErrorKind::Syntactic, "empty expression")),
            Some(result) if sy.out.is_empty() => self.freeze_operand(result),
            Some(_) => Err(self.error(
                ErrorKind::Internal,
                "operands left over after expression reduction",
            )),
        }
    }

    /// Pops the top operator and builds its typed node.
    fn reduce(&mut self, sy: &mut Shunt<'a>) -> ParseResult<()> {
        let (info, pos) = match sy.ops.pop() {
            Some(OpEntry::Oper { info, pos }) => (info, pos),
            Some(OpEntry::Paren { pos }) | Some(OpEntry::CallParen { pos, .. }) => {
                return Err(self.error_at(pos, ErrorKind::Syntactic, "unmatched parenthesis"));
            }
            None => return Err(self.error(ErrorKind::Internal, "operator stack underflow")),
        };
        trace!("reduce '{}'", info.op);

        let count = info.operands as usize;
        if sy.out.len() < count {
            let msg = format!("not enough operands for '{}'", info.op);
            return Err(self.error_at(pos, ErrorKind::Internal, msg));
        }
        let mut taken = sy.out.split_off(sy.out.len() - count).into_iter();
        let (left, right) = match (taken.next(), taken.next()) {
            (Some(left), Some(right)) => (left, right),
            _ => return Err(self.error_at(pos, ErrorKind::Internal, "operand stack underflow")),
        };

        if info.id == OperId::Comma {
            // Grow a block: this is how argument lists accumulate.
            let right = self.freeze_operand(right)?;
            let mut block = match left {
                Operand::Block(block) => block,
                Operand::Expr(first) => {
                    let mut block = BlockBuilder::new(pos);
                    block.push_expr(first);
                    block
                }
            };
            block.push_expr(right);
            sy.out.push(Operand::Block(block));
            return Ok(());
        }

        let left = self.require_expr(left, pos)?;
        let right = self.freeze_operand(right)?;
        let (lt, rt) = (left.ty(), right.ty());
        use TypeKind::{Float, Vector};
        let node = match (info.id, lt, rt) {
            (OperId::Add, Float, Float) => self.binary(pos, BinaryOp::AddF, left, right),
            (OperId::Add, Vector, Vector) => self.binary(pos, BinaryOp::AddV, left, right),
            (OperId::Sub, Float, Float) => self.binary(pos, BinaryOp::SubF, left, right),
            (OperId::Sub, Vector, Vector) => self.binary(pos, BinaryOp::SubV, left, right),
            (OperId::Mul, Float, Float) => self.binary(pos, BinaryOp::MulF, left, right),
            (OperId::Mul, Float, Vector) => self.binary(pos, BinaryOp::MulFv, left, right),
            (OperId::Mul, Vector, Float) => self.binary(pos, BinaryOp::MulVf, left, right),
            (OperId::Mul, Vector, Vector) => self.binary(pos, BinaryOp::MulV, left, right),
            (OperId::Div, Float, Float) => self.binary(pos, BinaryOp::DivF, left, right),
            (OperId::Assign, _, _) => {
                if lt != rt {
                    let msg = format!("cannot assign {rt} to {lt}");
                    return Err(self.error_at(pos, ErrorKind::Type, msg));
                }
                let Some(store) = StoreOp::for_type(lt) else {
                    return Err(self.error_at(
                        pos,
                        ErrorKind::Type,
                        "cannot assign to a void expression",
                    ));
                };
                self.ctx.alloc_expr(Expr::Store {
                    pos,
                    op: store,
                    dest: left,
                    source: right,
                })
            }
            _ => {
                let msg = match info.id {
                    OperId::Add => format!("cannot add {lt} and {rt}"),
                    OperId::Sub => format!("cannot subtract {rt} from {lt}"),
                    OperId::Mul => format!("cannot multiply {lt} by {rt}"),
                    OperId::Div => format!("cannot divide {lt} by {rt}"),
                    _ => format!("cannot apply '{}' to {lt} and {rt}", info.op),
                };
                return Err(self.error_at(pos, ErrorKind::Type, msg));
            }
        };
        sy.out.push(Operand::Expr(node));
        Ok(())
    }

    fn binary(
        &mut self,
        pos: SourcePos,
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    ) -> &'a Expr<'a> {
        self.ctx.alloc_expr(Expr::Binary {
            pos,
            op,
            left,
            right,
        })
    }

    /// Closes a parenthesis: reduce down to the nearest marker, then either
    /// form a call or pop the grouping.
    ///
    /// `functions_only` is set when `)` arrived while an operand was
    /// expected; only an argument-less call may close there, so a grouping
    /// marker means the parentheses were empty.
    fn close_paren(&mut self, sy: &mut Shunt<'a>, functions_only: bool) -> ParseResult<()> {
        loop {
            match sy.ops.last() {
                None => {
                    return Err(self.error(ErrorKind::Syntactic, "unmatched closing parenthesis"))
                }
                Some(&OpEntry::CallParen { .. }) => return self.close_call(sy),
                Some(&OpEntry::Paren { pos }) => {
                    if functions_only {
                        return Err(self.error_at(
                            pos,
                            ErrorKind::Syntactic,
                            "empty parenthesis expression",
                        ));
                    }
                    sy.ops.pop();
                    return Ok(());
                }
                Some(&OpEntry::Oper { .. }) => self.reduce(sy)?,
            }
        }
    }

    /// Replaces the callee operand with a call node.
    ///
    /// Everything above the callee is the argument list: nothing, a single
    /// expression, or a comma block whose statements become the arguments.
    fn close_call(&mut self, sy: &mut Shunt<'a>) -> ParseResult<()> {
        let (pos, fid) = match sy.ops.pop() {
            Some(OpEntry::CallParen { pos, fid }) => (pos, fid),
            _ => {
                return Err(self.error(ErrorKind::Internal, "call reduction without a call marker"))
            }
        };
        if sy.out.len() <= fid {
            return Err(self.error_at(pos, ErrorKind::Internal, "function call without a callee"));
        }

        let args: Vec<&'a Expr<'a>> = match sy.out.len() - fid {
            1 => Vec::new(),
            2 => match sy.out.pop() {
                Some(Operand::Expr(arg)) => vec![arg],
                Some(Operand::Block(block)) => block.into_exprs(),
                None => {
                    return Err(self.error_at(pos, ErrorKind::Internal, "missing argument operand"))
                }
            },
            _ => return Err(self.error_at(pos, ErrorKind::Internal, "malformed function call")),
        };

        let callee = match &sy.out[fid] {
            Operand::Expr(callee) => *callee,
            Operand::Block(_) => {
                return Err(self.error_at(pos, ErrorKind::Internal, "call target is a block"))
            }
        };
        let signature = match callee {
            Expr::Value(value) if value.ty == TypeKind::Function => {
                Some((value.params, value.return_type))
            }
            _ => None,
        };
        let Some((params, return_type)) = signature else {
            return Err(self.error_at(pos, ErrorKind::Type, "called value is not a function"));
        };
        let Some(ret) = return_type else {
            return Err(self.error_at(
                pos,
                ErrorKind::Type,
                "could not determine function return type",
            ));
        };
        if params.len() != args.len() {
            let msg = format!("expected {} parameters, got {}", params.len(), args.len());
            return Err(self.error_at(pos, ErrorKind::Type, msg));
        }
        for (i, (param, arg)) in params.iter().zip(&args).enumerate() {
            if param.ty != arg.ty() {
                let msg = format!(
                    "argument {} has type {}, expected {}",
                    i + 1,
                    arg.ty(),
                    param.ty
                );
                return Err(self.error_at(pos, ErrorKind::Type, msg));
            }
        }

        let call = self.ctx.alloc_expr(Expr::Call {
            pos,
            callee,
            args: self.ctx.alloc_expr_slice(args),
            ty: ret.ty,
        });
        sy.out[fid] = Operand::Expr(call);
        Ok(())
    }

    /// An operand a non-comma operator consumes from below the top.
    fn require_expr(&mut self, operand: Operand<'a>, pos: SourcePos) -> ParseResult<&'a Expr<'a>> {
        match operand {
            Operand::Expr(expr) => Ok(expr),
            Operand::Block(_) => Err(self.error_at(
                pos,
                ErrorKind::Internal,
                "operator applied to an argument block",
            )),
        }
    }

    /// Turns any operand into an expression, freezing a comma block.
    fn freeze_operand(&mut self, operand: Operand<'a>) -> ParseResult<&'a Expr<'a>> {
        match operand {
            Operand::Expr(expr) => Ok(expr),
            Operand::Block(block) => {
                if block.is_empty() {
                    return Err(self.error_at(
                        block.pos,
                        ErrorKind::Internal,
                        "empty expression block",
                    ));
                }
                let frozen = block.freeze(&self.ctx);
                Ok(self.ctx.alloc_expr(Expr::Block(frozen)))
            }
        }
    }
}
